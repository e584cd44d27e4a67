//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                        - Liveness check
//! GET  /health/ready                  - Readiness check (pings the database)
//!
//! # Orders
//! GET  /api/orders                    - All orders (filter/paginate)
//! GET  /api/orders/{id}               - Order detail with line items
//! POST /api/orders/{id}/status        - Apply a status transition
//!
//! # Returns
//! GET  /api/returns                   - All returns (filter/paginate)
//! GET  /api/returns/{id}              - Return detail with lines
//! POST /api/returns/{id}/status       - Apply a status transition
//! POST /api/returns/{id}/refund       - Process the refund (VERIFIED only)
//! POST /api/returns/{id}/restock      - Restock returned goods (once)
//!
//! # Products
//! GET  /api/products                  - Catalog with live stock
//! POST /api/products/{id}/stock       - Set available stock (receiving)
//! ```
//!
//! Every route requires `Authorization: Bearer <ADMIN_API_TOKEN>` and every
//! response uses the `{success, message?, data?}` envelope.

pub mod orders;
pub mod products;
pub mod returns;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/{id}/status", post(orders::update_status))
}

/// Create the admin return routes router.
pub fn return_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(returns::list))
        .route("/{id}", get(returns::show))
        .route("/{id}/status", post(returns::update_status))
        .route("/{id}/refund", post(returns::refund))
        .route("/{id}/restock", post(returns::restock))
}

/// Create the admin product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list))
        .route("/{id}/stock", post(products::set_stock))
}

/// Create the complete admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/api/orders", order_routes())
        .nest("/api/returns", return_routes())
        .nest("/api/products", product_routes())
}
