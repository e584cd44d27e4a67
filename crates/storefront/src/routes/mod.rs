//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                      - Liveness check
//! GET    /health/ready                - Readiness check (pings the database)
//!
//! # Cart
//! GET    /cart                        - Priced cart view
//! POST   /cart/items                  - Add a product (increments on repeat)
//! PUT    /cart/items/{product_id}     - Set a line's quantity
//! DELETE /cart/items/{product_id}     - Remove a line
//! DELETE /cart                        - Clear the cart
//!
//! # Checkout
//! POST   /checkout                    - Commit the cart into an order
//!
//! # Orders
//! GET    /orders                      - Own orders (filter/sort/paginate)
//! GET    /orders/{id}                 - Order detail with line items
//! POST   /orders/{id}/cancel          - Cancel (PENDING/CONFIRMED only)
//! GET    /orders/{id}/shipment        - Fulfillment timeline
//! POST   /orders/{id}/returns         - Open a return (DELIVERED only)
//!
//! # Returns
//! GET    /returns                     - Own returns
//! GET    /returns/{id}                - Return detail with lines
//! POST   /returns/{id}/tracking       - Attach return tracking number
//! POST   /returns/{id}/cancel         - Cancel an open return
//! ```
//!
//! Every response uses the `{success, message?, data?}` envelope. Caller
//! identity arrives on the `X-User-Id` header (see [`crate::middleware`]).

pub mod cart;
pub mod checkout;
pub mod orders;
pub mod returns;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route(
            "/items/{product_id}",
            put(cart::update).delete(cart::remove),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/shipment", get(orders::shipment))
        .route("/{id}/returns", post(returns::create))
}

/// Create the return routes router.
pub fn return_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(returns::list))
        .route("/{id}", get(returns::show))
        .route("/{id}/tracking", post(returns::attach_tracking))
        .route("/{id}/cancel", post(returns::cancel))
}

/// Create the complete storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::commit))
        .nest("/orders", order_routes())
        .nest("/returns", return_routes())
        .fallback(not_found)
}

/// JSON 404 for unknown paths.
async fn not_found() -> (axum::http::StatusCode, axum::Json<driftwood_core::ApiResponse<()>>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        axum::Json(driftwood_core::ApiResponse::error("no such route")),
    )
}
