//! Return route handlers: creation, listing, tracking, cancellation.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use tracing::instrument;

use driftwood_commerce::models::{Return, ReturnFilter, ReturnRequestItem, ReturnWithItems};
use driftwood_commerce::services::ReturnService;
use driftwood_core::{ApiResponse, OrderId, Page, ReturnId, ReturnStatus};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Create return request body.
#[derive(Debug, Deserialize)]
pub struct CreateReturnRequest {
    pub items: Vec<ReturnRequestItem>,
    pub reason: String,
    pub refund_method: String,
}

/// Attach tracking request body.
#[derive(Debug, Deserialize)]
pub struct AttachTrackingRequest {
    pub tracking_number: String,
}

/// Query parameters for the return listing.
#[derive(Debug, Deserialize)]
pub struct ReturnListQuery {
    pub status: Option<ReturnStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Open a return against one of the caller's delivered orders.
#[instrument(skip(state, body))]
pub async fn create(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(order_id): Path<OrderId>,
    Json(body): Json<CreateReturnRequest>,
) -> Result<(StatusCode, Json<ApiResponse<ReturnWithItems>>)> {
    if body.reason.trim().is_empty() {
        return Err(AppError::BadRequest("a reason is required".to_string()));
    }

    let ret = ReturnService::new(state.pool())
        .create(user.id, order_id, body.items, body.reason, body.refund_method)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(ret, "return requested")),
    ))
}

/// List the caller's returns.
#[instrument(skip(state))]
pub async fn list(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Query(query): Query<ReturnListQuery>,
) -> Result<Json<ApiResponse<Page<Return>>>> {
    let filter = ReturnFilter {
        status: query.status,
        user_id: Some(user.id),
        page: query.page.unwrap_or(1),
        per_page: query.per_page.unwrap_or(20),
    }
    .normalized();

    let (returns, total) = ReturnService::new(state.pool()).list(&filter).await?;

    Ok(Json(ApiResponse::ok(Page::new(
        returns,
        filter.page,
        filter.per_page,
        total,
    ))))
}

/// Show one of the caller's returns, with lines.
#[instrument(skip(state))]
pub async fn show(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool())
        .get_owned(user.id, id)
        .await?;
    Ok(Json(ApiResponse::ok(ret)))
}

/// Attach the return-shipment tracking number (REQUESTED -> `IN_TRANSIT`).
#[instrument(skip(state, body))]
pub async fn attach_tracking(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
    Json(body): Json<AttachTrackingRequest>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let tracking = body.tracking_number.trim();
    if tracking.is_empty() {
        return Err(AppError::BadRequest(
            "a tracking number is required".to_string(),
        ));
    }

    let ret = ReturnService::new(state.pool())
        .attach_tracking(user.id, id, tracking)
        .await?;
    Ok(Json(ApiResponse::ok_with_message(ret, "return in transit")))
}

/// Cancel one of the caller's open returns.
#[instrument(skip(state))]
pub async fn cancel(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool()).cancel(user.id, id).await?;
    Ok(Json(ApiResponse::ok_with_message(ret, "return cancelled")))
}
