//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; responses use the standard API envelope.
//!
//! Precondition violations (empty cart, insufficient stock, illegal
//! transitions, ...) are surfaced verbatim, naming the offending entity.
//! Storage failures are reported generically and never leak details.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use driftwood_core::ApiResponse;
use driftwood_commerce::db::RepositoryError;
use driftwood_commerce::services::{CheckoutError, OrderError, ReturnError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Checkout commitment failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

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
            Self::Checkout(CheckoutError::Repository(err))
            | Self::Order(OrderError::Repository(err))
            | Self::Return(ReturnError::Repository(err)) => is_server_repository_error(err),
            _ => false,
        }
    }

    /// Map to an HTTP status and client-facing message.
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Checkout(err) => checkout_status(err),
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

fn checkout_status(err: &CheckoutError) -> (StatusCode, String) {
    match err {
        CheckoutError::CartEmpty => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::ProductUnavailable { .. } | CheckoutError::InsufficientStock { .. } => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CheckoutError::Repository(inner) => repository_status(inner),
    }
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
    use driftwood_core::ProductId;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_precondition_violations_are_client_errors() {
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::CartEmpty)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Checkout(CheckoutError::InsufficientStock {
                product_id: ProductId::new(1),
                name: "Walnut Tray".to_string(),
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::NotCancellable)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Return(ReturnError::OrderNotDelivered)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Return(ReturnError::ReturnNotVerified)),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_authorization_and_not_found_mapping() {
        assert_eq!(
            get_status(AppError::Order(OrderError::NotOwner)),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::Order(OrderError::NotFound)),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::NotFound("product".to_string())),
            StatusCode::NOT_FOUND
        );
    }

    #[test]
    fn test_storage_failures_are_generic() {
        let err = AppError::Repository(RepositoryError::DataCorruption("bad status".to_string()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Internal server error");
    }

    #[test]
    fn test_precondition_message_is_verbatim() {
        let err = AppError::Checkout(CheckoutError::ProductUnavailable {
            product_id: ProductId::new(3),
            name: "Brass Hook".to_string(),
        });
        let (_, message) = err.status_and_message();
        assert_eq!(message, "product \"Brass Hook\" is not available");
    }
}
