//! The stock ledger: the only code allowed to mutate `shop.products.stock`.
//!
//! All three mutation paths (checkout reservation, cancellation release,
//! post-return restock) route through this module. `reserve` performs the
//! sufficiency check and the decrement as ONE conditional UPDATE, so two
//! concurrent commitments against the last unit serialize inside Postgres
//! and exactly one of them wins; application code never read-modify-writes
//! the counter.

use sqlx::PgConnection;
use thiserror::Error;

use driftwood_core::ProductId;

use super::RepositoryError;

/// Errors from stock reservation.
#[derive(Debug, Error)]
pub enum StockError {
    /// The product exists and is sellable, but has fewer units than requested.
    #[error("insufficient stock for product {product_id}")]
    Insufficient { product_id: ProductId },

    /// The product is missing or not currently sellable.
    #[error("product {product_id} is not available")]
    Unavailable { product_id: ProductId },

    /// Underlying storage error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl From<sqlx::Error> for StockError {
    fn from(err: sqlx::Error) -> Self {
        Self::Repository(RepositoryError::Database(err))
    }
}

/// Narrow interface over the per-product available-quantity counter.
pub struct StockLedger;

impl StockLedger {
    /// Atomically reserve `quantity` units of a product.
    ///
    /// The sellable check, the sufficiency check, and the decrement are a
    /// single conditional UPDATE. Must be called inside the transaction that
    /// also writes the consuming order, so a failed commitment rolls the
    /// decrement back.
    ///
    /// # Errors
    ///
    /// - `StockError::Insufficient` when fewer than `quantity` units remain
    /// - `StockError::Unavailable` when the product is missing or unsellable
    /// - `StockError::Repository` for storage failures
    pub async fn reserve(
        conn: &mut PgConnection,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), StockError> {
        let result = sqlx::query(
            "UPDATE shop.products
             SET stock = stock - $2, updated_at = now()
             WHERE id = $1 AND sellable AND stock >= $2",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // The conditional update matched nothing; find out why for the error.
        let sellable = sqlx::query_scalar::<_, bool>(
            "SELECT sellable FROM shop.products WHERE id = $1",
        )
        .bind(product_id)
        .fetch_optional(&mut *conn)
        .await?;

        match sellable {
            Some(true) => Err(StockError::Insufficient { product_id }),
            _ => Err(StockError::Unavailable { product_id }),
        }
    }

    /// Return `quantity` units to available stock.
    ///
    /// Used only by order cancellation and by the explicit post-return
    /// restock action. Quantities must come from immutable snapshots (order
    /// line items / return lines); the ledger enforces no upper bound.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product no longer exists.
    pub async fn release(
        conn: &mut PgConnection,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.products
             SET stock = stock + $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(product_id)
        .bind(quantity)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Set a product's stock to an absolute value (admin stock receiving).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn set_stock(
        conn: &mut PgConnection,
        product_id: ProductId,
        stock: i32,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.products
             SET stock = $2, updated_at = now()
             WHERE id = $1",
        )
        .bind(product_id)
        .bind(stock)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
