//! Database operations for cart staging rows.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use driftwood_core::{CartEntryId, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartEntry, CartLine};
use crate::pricing;

/// Internal row type for cart entry queries.
#[derive(Debug, sqlx::FromRow)]
struct CartEntryRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartEntryRow> for CartEntry {
    fn from(row: CartEntryRow) -> Self {
        Self {
            id: CartEntryId::new(row.id),
            user_id: UserId::new(row.user_id),
            product_id: ProductId::new(row.product_id),
            quantity: row.quantity,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Internal row type for cart lines joined with product data.
#[derive(Debug, sqlx::FromRow)]
struct CartLineRow {
    product_id: i64,
    product_name: String,
    price: Decimal,
    promo_price: Option<Decimal>,
    quantity: i32,
    stock: i32,
    sellable: bool,
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        let unit_price = pricing::effective_unit_price(row.price, row.promo_price);
        Self {
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price,
            quantity: row.quantity,
            line_total: unit_price * Decimal::from(row.quantity),
            available_stock: row.stock,
            sellable: row.sellable,
        }
    }
}

const ENTRY_COLUMNS: &str = "id, user_id, product_id, quantity, created_at, updated_at";

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List a user's raw cart entries.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_entries(&self, user_id: UserId) -> Result<Vec<CartEntry>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartEntryRow>(&format!(
            "SELECT {ENTRY_COLUMNS} FROM shop.cart_entries
             WHERE user_id = $1
             ORDER BY created_at"
        ))
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List a user's cart joined with live product data, priced for display.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, CartLineRow>(
            "SELECT c.product_id, p.name AS product_name, p.price, p.promo_price,
                    c.quantity, p.stock, p.sellable
             FROM shop.cart_entries c
             INNER JOIN shop.products p ON p.id = c.product_id
             WHERE c.user_id = $1
             ORDER BY c.created_at",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Add `quantity` units of a product to the cart.
    ///
    /// Creates the entry on first add; increments on repeat add. The stored
    /// quantity is capped at `stock_cap` (the product's current stock) in the
    /// same statement, so repeated adds cannot stage more than is available.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
        stock_cap: i32,
    ) -> Result<CartEntry, RepositoryError> {
        let row = sqlx::query_as::<_, CartEntryRow>(&format!(
            "INSERT INTO shop.cart_entries (user_id, product_id, quantity)
             VALUES ($1, $2, LEAST($3, $4))
             ON CONFLICT (user_id, product_id) DO UPDATE
             SET quantity = LEAST(shop.cart_entries.quantity + EXCLUDED.quantity, $4),
                 updated_at = now()
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .bind(stock_cap)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Set the quantity of an existing entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the entry doesn't exist.
    pub async fn set_quantity(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<CartEntry, RepositoryError> {
        let row = sqlx::query_as::<_, CartEntryRow>(&format!(
            "UPDATE shop.cart_entries
             SET quantity = $3, updated_at = now()
             WHERE user_id = $1 AND product_id = $2
             RETURNING {ENTRY_COLUMNS}"
        ))
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        Ok(row.into())
    }

    /// Remove one product from the cart.
    ///
    /// # Returns
    ///
    /// Returns `true` if an entry was removed, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<bool, RepositoryError> {
        let result =
            sqlx::query("DELETE FROM shop.cart_entries WHERE user_id = $1 AND product_id = $2")
                .bind(user_id.as_i64())
                .bind(product_id.as_i64())
                .execute(self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Clear a user's cart (explicit user action).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn clear(&self, user_id: UserId) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_entries WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Consume a user's cart inside the commitment transaction.
    ///
    /// This is the explicit, named cart-consumption step of checkout: it runs
    /// on the commitment's connection so a rolled-back commitment provably
    /// leaves the cart untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn consume(
        conn: &mut PgConnection,
        user_id: UserId,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("DELETE FROM shop.cart_entries WHERE user_id = $1")
            .bind(user_id.as_i64())
            .execute(&mut *conn)
            .await?;

        Ok(result.rows_affected())
    }
}
