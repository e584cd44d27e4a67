//! Admin order route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use driftwood_commerce::models::{Order, OrderFilter, OrderSort, OrderWithItems};
use driftwood_commerce::services::OrderLifecycleService;
use driftwood_core::{ApiResponse, OrderId, OrderStatus, Page, UserId};

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Query parameters for the admin order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub user_id: Option<UserId>,
    pub sort: Option<OrderSort>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
    /// Carrier tracking number; only meaningful when shipping.
    pub tracking_number: Option<String>,
}

/// List orders across all users.
#[instrument(skip(state))]
pub async fn list(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Page<Order>>>> {
    let filter = OrderFilter {
        status: query.status,
        user_id: query.user_id,
        sort: query.sort.unwrap_or_default(),
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }
    .normalized();

    let (orders, total) = OrderLifecycleService::new(state.pool()).list(&filter).await?;

    Ok(Json(ApiResponse::ok(Page::new(
        orders,
        filter.page,
        filter.per_page,
        total,
    ))))
}

/// Show any order, with line items.
#[instrument(skip(state))]
pub async fn show(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<OrderWithItems>>> {
    let order = OrderLifecycleService::new(state.pool()).get(id).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Apply a status transition.
///
/// Any transition the table allows, including cancelling a PREPARING order
/// (which releases its reserved stock, same as a user cancellation).
#[instrument(skip(state, body))]
pub async fn update_status(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<OrderWithItems>>> {
    let order = OrderLifecycleService::new(state.pool())
        .update_status(id, body.status, body.tracking_number.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        order,
        format!("order moved to {}", body.status),
    )))
}
