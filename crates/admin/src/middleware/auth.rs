//! Admin authentication extractor.
//!
//! Every admin route requires `Authorization: Bearer <ADMIN_API_TOKEN>`. The
//! token is validated for length and entropy at startup (see
//! [`crate::config`]); here it only needs comparing.

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;

use driftwood_core::ApiResponse;

use crate::state::AppState;

/// Extractor that requires the admin bearer token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     _admin: RequireAdminToken,
/// ) -> impl IntoResponse {
///     "only admins see this"
/// }
/// ```
#[derive(Debug)]
pub struct RequireAdminToken;

/// Rejection when the bearer token is missing or wrong.
pub struct AdminAuthRejection;

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<()>::error("admin authentication required")),
        )
            .into_response()
    }
}

impl FromRequestParts<AppState> for RequireAdminToken {
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(AdminAuthRejection)?;

        if presented != state.config().api_token.expose_secret() {
            return Err(AdminAuthRejection);
        }

        Ok(Self)
    }
}
