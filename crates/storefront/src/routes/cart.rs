//! Cart route handlers.
//!
//! The cart is a staging area only: nothing here touches stock. Quantities
//! are capped against live stock so the storefront can't stage more than is
//! available, but the binding check happens at checkout.

use axum::{
    Json,
    extract::{Path, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use driftwood_commerce::db::{CartRepository, ProductRepository};
use driftwood_commerce::models::{CartLine, Product};
use driftwood_core::{ApiResponse, ProductId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Priced cart view returned by every cart endpoint.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartLine>,
    pub subtotal: Decimal,
    pub item_count: i32,
}

impl CartView {
    fn from_lines(items: Vec<CartLine>) -> Self {
        let subtotal = items.iter().map(|line| line.line_total).sum();
        let item_count = items.iter().map(|line| line.quantity).sum();
        Self {
            items,
            subtotal,
            item_count,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    pub quantity: Option<i32>,
}

/// Update quantity request body.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub quantity: i32,
}

async fn cart_view(state: &AppState, user: driftwood_core::UserId) -> Result<CartView> {
    let lines = CartRepository::new(state.pool()).list_lines(user).await?;
    Ok(CartView::from_lines(lines))
}

/// Fetch a product that can currently be added to a cart.
async fn sellable_product(state: &AppState, product_id: ProductId) -> Result<Product> {
    let product = ProductRepository::new(state.pool())
        .get(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("product".to_string()))?;
    if !product.sellable {
        return Err(AppError::BadRequest(format!(
            "product \"{}\" is not available",
            product.name
        )));
    }
    Ok(product)
}

/// Display the priced cart.
#[instrument(skip(state))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CartView>>> {
    Ok(Json(ApiResponse::ok(cart_view(&state, user.id).await?)))
}

/// Add a product to the cart.
///
/// Creates the entry on first add; increments on repeat add, capped at the
/// product's current stock.
#[instrument(skip(state))]
pub async fn add(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    let quantity = body.quantity.unwrap_or(1);
    if quantity < 1 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }

    let product = sellable_product(&state, body.product_id).await?;
    if product.stock == 0 {
        return Err(AppError::BadRequest(format!(
            "\"{}\" is out of stock",
            product.name
        )));
    }

    CartRepository::new(state.pool())
        .add(user.id, product.id, quantity, product.stock)
        .await?;

    Ok(Json(ApiResponse::ok(cart_view(&state, user.id).await?)))
}

/// Set a cart line's quantity.
#[instrument(skip(state))]
pub async fn update(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
    Json(body): Json<UpdateCartRequest>,
) -> Result<Json<ApiResponse<CartView>>> {
    if body.quantity < 1 {
        return Err(AppError::BadRequest("quantity must be positive".to_string()));
    }

    let product = sellable_product(&state, product_id).await?;
    if body.quantity > product.stock {
        return Err(AppError::BadRequest(format!(
            "only {} units of \"{}\" available",
            product.stock, product.name
        )));
    }

    CartRepository::new(state.pool())
        .set_quantity(user.id, product.id, body.quantity)
        .await
        .map_err(|err| match err {
            driftwood_commerce::db::RepositoryError::NotFound => {
                AppError::NotFound("cart entry".to_string())
            }
            other => AppError::Repository(other),
        })?;

    Ok(Json(ApiResponse::ok(cart_view(&state, user.id).await?)))
}

/// Remove a line from the cart.
#[instrument(skip(state))]
pub async fn remove(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(product_id): Path<ProductId>,
) -> Result<Json<ApiResponse<CartView>>> {
    let removed = CartRepository::new(state.pool())
        .remove(user.id, product_id)
        .await?;
    if !removed {
        return Err(AppError::NotFound("cart entry".to_string()));
    }

    Ok(Json(ApiResponse::ok(cart_view(&state, user.id).await?)))
}

/// Clear the cart.
#[instrument(skip(state))]
pub async fn clear(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CartView>>> {
    CartRepository::new(state.pool()).clear(user.id).await?;
    Ok(Json(ApiResponse::ok_with_message(
        cart_view(&state, user.id).await?,
        "cart cleared",
    )))
}
