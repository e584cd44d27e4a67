//! Unified error handling with Sentry integration.
//!
//! Same contract as the storefront's error type: precondition violations
//! (illegal transitions, unverified refunds, double restocks) surface
//! verbatim; storage failures are captured to Sentry and reported
//! generically. Admin operations never hit the checkout path, so there is no
//! checkout variant here.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use driftwood_core::ApiResponse;
use driftwood_commerce::db::RepositoryError;
use driftwood_commerce::services::{OrderError, ReturnError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Order lifecycle operation failed.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// Return operation failed.
    #[error(transparent)]
    Return(#[from] ReturnError),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether this error should be captured to Sentry.
    fn is_server_error(&self) -> bool {
        match self {
            Self::Internal(_) => true,
            Self::Repository(err) => is_server_repository_error(err),
            Self::Order(OrderError::Repository(err))
            | Self::Return(ReturnError::Repository(err)) => is_server_repository_error(err),
            _ => false,
        }
    }

    /// Map to an HTTP status and client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Order(err) => order_status(err),
            Self::Return(err) => return_status(err),
            Self::Repository(err) => repository_status(err),
            Self::NotFound(what) => (StatusCode::NOT_FOUND, format!("{what} not found")),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }
}

const fn is_server_repository_error(err: &RepositoryError) -> bool {
    matches!(
        err,
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_)
    )
}

fn order_status(err: &OrderError) -> (StatusCode, String) {
    match err {
        OrderError::NotFound => (StatusCode::NOT_FOUND, err.to_string()),
        OrderError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
        OrderError::IllegalTransition { .. } | OrderError::NotCancellable => {
            (StatusCode::CONFLICT, err.to_string())
        }
        OrderError::Repository(inner) => repository_status(inner),
    }
}

fn return_status(err: &ReturnError) -> (StatusCode, String) {
    match err {
        ReturnError::NotFound | ReturnError::OrderNotFound => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        ReturnError::NotOwner => (StatusCode::FORBIDDEN, err.to_string()),
        ReturnError::NoItems
        | ReturnError::UnknownLineItem { .. }
        | ReturnError::DuplicateLineItem { .. }
        | ReturnError::InvalidQuantity { .. }
        | ReturnError::QuantityExceedsOriginal { .. }
        | ReturnError::RefundRequiresProcess => (StatusCode::BAD_REQUEST, err.to_string()),
        ReturnError::OrderNotDelivered
        | ReturnError::ReturnAlreadyExists
        | ReturnError::ReturnNotVerified
        | ReturnError::IllegalTransition { .. }
        | ReturnError::NotRestockable { .. }
        | ReturnError::AlreadyRestocked => (StatusCode::CONFLICT, err.to_string()),
        ReturnError::Repository(inner) => repository_status(inner),
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "not found".to_string()),
        RepositoryError::Conflict(message) => (StatusCode::CONFLICT, message.clone()),
        RepositoryError::Database(_) | RepositoryError::DataCorruption(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message) = self.status_and_message();
        (status, Json(ApiResponse::<()>::error(message))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use driftwood_core::{OrderStatus, ReturnStatus};

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_illegal_transition_is_conflict() {
        assert_eq!(
            get_status(AppError::Order(OrderError::IllegalTransition {
                from: OrderStatus::Delivered,
                to: OrderStatus::Pending,
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Return(ReturnError::IllegalTransition {
                from: ReturnStatus::Refunded,
                to: ReturnStatus::Received,
            })),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_refund_guard_mapping() {
        assert_eq!(
            get_status(AppError::Return(ReturnError::ReturnNotVerified)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Return(ReturnError::RefundRequiresProcess)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Return(ReturnError::AlreadyRestocked)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_storage_failures_are_generic() {
        let err = AppError::Repository(RepositoryError::DataCorruption("bad status".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }
}
