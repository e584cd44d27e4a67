//! Admin product route handlers: catalog view and stock receiving.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use driftwood_commerce::db::{ProductRepository, RepositoryError, StockLedger};
use driftwood_commerce::models::Product;
use driftwood_core::{ApiResponse, Page, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Query parameters for the product listing.
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Stock receiving request body.
#[derive(Debug, Deserialize)]
pub struct SetStockRequest {
    pub stock: i32,
}

/// List the catalog with live stock.
#[instrument(skip(state))]
pub async fn list(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> Result<Json<ApiResponse<Page<Product>>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
    let offset = i64::from(page - 1) * i64::from(per_page);

    let repo = ProductRepository::new(state.pool());
    let products = repo.list(i64::from(per_page), offset).await?;
    let total = repo.count().await?;

    Ok(Json(ApiResponse::ok(Page::new(
        products, page, per_page, total,
    ))))
}

/// Set a product's available stock to an absolute value (receiving).
#[instrument(skip(state))]
pub async fn set_stock(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(body): Json<SetStockRequest>,
) -> Result<Json<ApiResponse<Product>>> {
    if body.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }

    let mut conn = state
        .pool()
        .acquire()
        .await
        .map_err(RepositoryError::from)?;
    StockLedger::set_stock(&mut conn, id, body.stock)
        .await
        .map_err(|err| match err {
            RepositoryError::NotFound => AppError::NotFound("product".to_string()),
            other => AppError::Repository(other),
        })?;

    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;

    Ok(Json(ApiResponse::ok_with_message(product, "stock updated")))
}
