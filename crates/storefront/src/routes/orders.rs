//! Order route handlers: listing, detail, cancellation, shipment timeline.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use driftwood_commerce::models::{Order, OrderFilter, OrderSort, OrderWithItems, ShipmentEvent};
use driftwood_commerce::services::OrderLifecycleService;
use driftwood_core::{ApiResponse, OrderId, OrderStatus, Page};

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Query parameters for the order listing.
#[derive(Debug, Deserialize)]
pub struct OrderListQuery {
    pub status: Option<OrderStatus>,
    pub sort: Option<OrderSort>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// List the caller's orders.
#[instrument(skip(state))]
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<OrderListQuery>,
) -> Result<Json<ApiResponse<Page<Order>>>> {
    let filter = OrderFilter {
        status: query.status,
        user_id: Some(user.id),
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

/// Show one of the caller's orders, with line items.
#[instrument(skip(state))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<OrderWithItems>>> {
    let order = OrderLifecycleService::new(state.pool())
        .get_owned(user.id, id)
        .await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Cancel one of the caller's orders.
///
/// Only legal while the order is PENDING or CONFIRMED; restores the order's
/// reserved stock.
#[instrument(skip(state))]
pub async fn cancel(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<OrderWithItems>>> {
    let order = OrderLifecycleService::new(state.pool())
        .cancel(user.id, id)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(order, "order cancelled")))
}

/// Fulfillment timeline for one of the caller's orders.
#[instrument(skip(state))]
pub async fn shipment(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<Vec<ShipmentEvent>>>> {
    let events = OrderLifecycleService::new(state.pool())
        .timeline_for(user.id, id)
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}
