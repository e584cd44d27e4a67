//! Database layer for the commerce engine.
//!
//! # Database: `driftwood`, schema `shop`
//!
//! ## Tables
//!
//! - `products` - catalog rows with the authoritative stock counter
//! - `cart_entries` - per-user staging rows, consumed by checkout
//! - `orders` / `order_items` - committed orders with price snapshots
//! - `returns` / `return_items` - the return/refund workflow
//! - `shipment_events` - append-only fulfillment timeline
//!
//! # Migrations
//!
//! Migrations are stored in `crates/commerce/migrations/` and run via:
//! ```bash
//! cargo run -p driftwood-cli -- migrate
//! ```
//!
//! # Query style
//!
//! Repositories use the runtime query API (`sqlx::query_as::<_, Row>` with
//! explicit binds and `derive(FromRow)` row structs), so the workspace builds
//! without a reachable database. Status columns are TEXT; rows decode through
//! `FromStr`, and an unparseable stored value surfaces as
//! [`RepositoryError::DataCorruption`].

pub mod cart;
pub mod orders;
pub mod products;
pub mod returns;
pub mod shipments;
pub mod stock;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use cart::CartRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use returns::ReturnRepository;
pub use shipments::ShipmentEventRepository;
pub use stock::{StockError, StockLedger};

/// Embedded migrations for the `shop` schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate open return).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
