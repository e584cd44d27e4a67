//! Database operations for returns and their requested lines.
//!
//! Status writes are compare-and-swaps on the expected current status, same
//! as the order repository. The partial unique index
//! `idx_returns_one_open_per_order` backs the one-open-return-per-order
//! invariant at the storage layer; a violation surfaces as
//! `RepositoryError::Conflict` so the service can report the typed error
//! even when two requests race.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use driftwood_core::{OrderId, OrderItemId, ProductId, ReturnId, ReturnItemId, ReturnStatus, UserId};

use super::RepositoryError;
use crate::models::{
    NewReturn, RestockLine, Return, ReturnFilter, ReturnItem, ReturnRequestItem, ReturnWithItems,
};

/// Internal row type for return queries.
#[derive(Debug, sqlx::FromRow)]
struct ReturnRow {
    id: i64,
    order_id: i64,
    user_id: i64,
    return_number: String,
    status: String,
    reason: String,
    refund_amount: Decimal,
    refund_method: String,
    tracking_number: Option<String>,
    admin_notes: Option<String>,
    requested_at: DateTime<Utc>,
    received_at: Option<DateTime<Utc>>,
    refunded_at: Option<DateTime<Utc>>,
    restocked_at: Option<DateTime<Utc>>,
}

impl TryFrom<ReturnRow> for Return {
    type Error = RepositoryError;

    fn try_from(row: ReturnRow) -> Result<Self, Self::Error> {
        let status =
            ReturnStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;
        Ok(Self {
            id: ReturnId::new(row.id),
            order_id: OrderId::new(row.order_id),
            user_id: UserId::new(row.user_id),
            return_number: row.return_number,
            status,
            reason: row.reason,
            refund_amount: row.refund_amount,
            refund_method: row.refund_method,
            tracking_number: row.tracking_number,
            admin_notes: row.admin_notes,
            requested_at: row.requested_at,
            received_at: row.received_at,
            refunded_at: row.refunded_at,
            restocked_at: row.restocked_at,
        })
    }
}

/// Internal row type for return line queries.
#[derive(Debug, sqlx::FromRow)]
struct ReturnItemRow {
    id: i64,
    return_id: i64,
    order_item_id: i64,
    quantity: i32,
}

impl From<ReturnItemRow> for ReturnItem {
    fn from(row: ReturnItemRow) -> Self {
        Self {
            id: ReturnItemId::new(row.id),
            return_id: ReturnId::new(row.return_id),
            order_item_id: OrderItemId::new(row.order_item_id),
            quantity: row.quantity,
        }
    }
}

/// Internal row type for restock lookups.
#[derive(Debug, sqlx::FromRow)]
struct RestockLineRow {
    product_id: i64,
    quantity: i32,
}

const RETURN_COLUMNS: &str = "id, order_id, user_id, return_number, status, reason, \
     refund_amount, refund_method, tracking_number, admin_notes, \
     requested_at, received_at, refunded_at, restocked_at";

const ITEM_COLUMNS: &str = "id, return_id, order_item_id, quantity";

/// Repository for return database operations.
pub struct ReturnRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ReturnRepository<'a> {
    /// Create a new return repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a return and its requested lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order already has an open
    /// return (partial unique index) or the return number collides.
    pub async fn insert(
        conn: &mut PgConnection,
        ret: &NewReturn,
        items: &[ReturnRequestItem],
    ) -> Result<ReturnWithItems, RepositoryError> {
        let row = sqlx::query_as::<_, ReturnRow>(&format!(
            "INSERT INTO shop.returns
                (order_id, user_id, return_number, reason, refund_amount, refund_method)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RETURN_COLUMNS}"
        ))
        .bind(ret.order_id.as_i64())
        .bind(ret.user_id.as_i64())
        .bind(&ret.return_number)
        .bind(&ret.reason)
        .bind(ret.refund_amount)
        .bind(&ret.refund_method)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("idx_returns_one_open_per_order")
            {
                return RepositoryError::Conflict(
                    "order already has an open return".to_string(),
                );
            }
            RepositoryError::Database(e)
        })?;

        let ret: Return = row.try_into()?;

        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, ReturnItemRow>(&format!(
                "INSERT INTO shop.return_items (return_id, order_item_id, quantity)
                 VALUES ($1, $2, $3)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(ret.id.as_i64())
            .bind(item.order_item_id.as_i64())
            .bind(item.quantity)
            .fetch_one(&mut *conn)
            .await?;
            inserted.push(row.into());
        }

        Ok(ReturnWithItems {
            ret,
            items: inserted,
        })
    }

    /// Get a return by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ReturnId) -> Result<Option<Return>, RepositoryError> {
        let row = sqlx::query_as::<_, ReturnRow>(&format!(
            "SELECT {RETURN_COLUMNS} FROM shop.returns WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get a return's requested lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: ReturnId) -> Result<Vec<ReturnItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ReturnItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.return_items WHERE return_id = $1 ORDER BY id"
        ))
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a return hydrated with its lines.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_items(
        &self,
        id: ReturnId,
    ) -> Result<Option<ReturnWithItems>, RepositoryError> {
        let Some(ret) = self.get(id).await? else {
            return Ok(None);
        };
        let items = self.items(id).await?;
        Ok(Some(ReturnWithItems { ret, items }))
    }

    /// Find the open (non-terminal) return for an order, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_open_for_order(
        &self,
        order_id: OrderId,
    ) -> Result<Option<Return>, RepositoryError> {
        let row = sqlx::query_as::<_, ReturnRow>(&format!(
            "SELECT {RETURN_COLUMNS} FROM shop.returns
             WHERE order_id = $1
               AND status NOT IN ('REFUNDED', 'REFUSED', 'CANCELLED')"
        ))
        .bind(order_id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// List returns matching a filter, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &ReturnFilter) -> Result<(Vec<Return>, u64), RepositoryError> {
        let status = filter.status.map(|s| s.as_str().to_string());
        let user_id = filter.user_id.as_ref().map(UserId::as_i64);

        let rows = sqlx::query_as::<_, ReturnRow>(&format!(
            "SELECT {RETURN_COLUMNS} FROM shop.returns
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR user_id = $2)
             ORDER BY requested_at DESC
             LIMIT $3 OFFSET $4"
        ))
        .bind(&status)
        .bind(user_id)
        .bind(i64::from(filter.per_page))
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shop.returns
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR user_id = $2)",
        )
        .bind(&status)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let returns = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((returns, total.try_into().unwrap_or(0)))
    }

    /// Return lines joined back to their products, for restocking.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn restock_lines(
        &self,
        id: ReturnId,
    ) -> Result<Vec<RestockLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, RestockLineRow>(
            "SELECT oi.product_id, ri.quantity
             FROM shop.return_items ri
             INNER JOIN shop.order_items oi ON oi.id = ri.order_item_id
             WHERE ri.return_id = $1
             ORDER BY ri.id",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RestockLine {
                product_id: ProductId::new(row.product_id),
                quantity: row.quantity,
            })
            .collect())
    }

    // =========================================================================
    // Status writes (compare-and-swap on the expected current status)
    // =========================================================================

    /// Move a return from `from` to `to`, stamping `received_at` when the
    /// return reaches RECEIVED and merging optional admin notes.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the return was concurrently
    /// moved out of `from`.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: ReturnId,
        from: ReturnStatus,
        to: ReturnStatus,
        admin_notes: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.returns
             SET status = $3,
                 admin_notes = COALESCE($4, admin_notes),
                 received_at = CASE WHEN $3 = 'RECEIVED' THEN now() ELSE received_at END
             WHERE id = $1 AND status = $2",
        )
        .bind(id.as_i64())
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(admin_notes)
        .execute(&mut *conn)
        .await?;

        Self::check_swapped(result.rows_affected(), from, to)
    }

    /// Attach the customer's return-shipment tracking number, moving the
    /// return from REQUESTED to IN_TRANSIT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the return is no longer in
    /// REQUESTED.
    pub async fn set_tracking(
        conn: &mut PgConnection,
        id: ReturnId,
        tracking_number: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.returns
             SET status = $3, tracking_number = $2
             WHERE id = $1 AND status = $4",
        )
        .bind(id.as_i64())
        .bind(tracking_number)
        .bind(ReturnStatus::InTransit.as_str())
        .bind(ReturnStatus::Requested.as_str())
        .execute(&mut *conn)
        .await?;

        Self::check_swapped(
            result.rows_affected(),
            ReturnStatus::Requested,
            ReturnStatus::InTransit,
        )
    }

    /// Move a VERIFIED return to REFUNDED, stamping the refund timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the return is no longer
    /// VERIFIED.
    pub async fn mark_refunded(
        conn: &mut PgConnection,
        id: ReturnId,
        refunded_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.returns
             SET status = $3, refunded_at = $2
             WHERE id = $1 AND status = $4",
        )
        .bind(id.as_i64())
        .bind(refunded_at)
        .bind(ReturnStatus::Refunded.as_str())
        .bind(ReturnStatus::Verified.as_str())
        .execute(&mut *conn)
        .await?;

        Self::check_swapped(
            result.rows_affected(),
            ReturnStatus::Verified,
            ReturnStatus::Refunded,
        )
    }

    /// Stamp `restocked_at`, guarding against a second restock.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the return was already
    /// restocked.
    pub async fn mark_restocked(
        conn: &mut PgConnection,
        id: ReturnId,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.returns
             SET restocked_at = now()
             WHERE id = $1 AND restocked_at IS NULL",
        )
        .bind(id.as_i64())
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::Conflict(
                "return already restocked".to_string(),
            ));
        }
        Ok(())
    }

    fn check_swapped(
        rows_affected: u64,
        from: ReturnStatus,
        to: ReturnStatus,
    ) -> Result<(), RepositoryError> {
        if rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "return left {from} before the transition to {to} applied"
            )));
        }
        Ok(())
    }
}
