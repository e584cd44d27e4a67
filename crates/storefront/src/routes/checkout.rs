//! Checkout route handler: the cart-to-order commitment endpoint.

use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use driftwood_commerce::models::{CheckoutInput, OrderWithItems};
use driftwood_commerce::services::CheckoutService;
use driftwood_core::ApiResponse;

use crate::error::Result;
use crate::middleware::RequireUser;
use crate::state::AppState;

/// Commit the caller's cart into an order.
///
/// All-or-nothing: on any failure the cart is untouched and no stock moves.
#[instrument(skip(state, body))]
pub async fn commit(
    RequireUser(user): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CheckoutInput>,
) -> Result<(StatusCode, Json<ApiResponse<OrderWithItems>>)> {
    let order = CheckoutService::new(state.pool())
        .commit(user.id, body)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok_with_message(order, "order created")),
    ))
}
