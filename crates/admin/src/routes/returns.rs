//! Admin return route handlers: inspection workflow, refund, restock.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use tracing::instrument;

use driftwood_commerce::models::{Return, ReturnFilter, ReturnWithItems};
use driftwood_commerce::services::ReturnService;
use driftwood_core::{ApiResponse, Page, ReturnId, ReturnStatus, UserId};

use crate::error::Result;
use crate::middleware::RequireAdminToken;
use crate::state::AppState;

/// Query parameters for the admin return listing.
#[derive(Debug, Deserialize)]
pub struct ReturnListQuery {
    pub status: Option<ReturnStatus>,
    pub user_id: Option<UserId>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ReturnStatus,
    pub admin_notes: Option<String>,
}

/// List returns across all users.
#[instrument(skip(state))]
pub async fn list(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Query(query): Query<ReturnListQuery>,
) -> Result<Json<ApiResponse<Page<Return>>>> {
    let filter = ReturnFilter {
        status: query.status,
        user_id: query.user_id,
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

/// Show any return, with lines.
#[instrument(skip(state))]
pub async fn show(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool()).get(id).await?;
    Ok(Json(ApiResponse::ok(ret)))
}

/// Apply a status transition (inspection workflow).
///
/// REFUNDED is rejected here; refunds go through the dedicated refund
/// operation so the refund timestamp is always stamped.
#[instrument(skip(state, body))]
pub async fn update_status(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool())
        .update_status(id, body.status, body.admin_notes.as_deref())
        .await?;

    Ok(Json(ApiResponse::ok_with_message(
        ret,
        format!("return moved to {}", body.status),
    )))
}

/// Process the refund for a VERIFIED return.
#[instrument(skip(state))]
pub async fn refund(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool()).process_refund(id).await?;
    Ok(Json(ApiResponse::ok_with_message(ret, "refund processed")))
}

/// Restock a verified or refunded return's goods (at most once).
#[instrument(skip(state))]
pub async fn restock(
    _admin: RequireAdminToken,
    State(state): State<AppState>,
    Path(id): Path<ReturnId>,
) -> Result<Json<ApiResponse<ReturnWithItems>>> {
    let ret = ReturnService::new(state.pool()).restock(id).await?;
    Ok(Json(ApiResponse::ok_with_message(ret, "stock restored")))
}
