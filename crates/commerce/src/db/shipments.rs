//! Database operations for the fulfillment timeline.

use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};

use driftwood_core::{OrderId, ShipmentEventId};

use super::RepositoryError;
use crate::models::ShipmentEvent;

/// Internal row type for shipment event queries.
#[derive(Debug, sqlx::FromRow)]
struct ShipmentEventRow {
    id: i64,
    order_id: i64,
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ShipmentEventRow> for ShipmentEvent {
    fn from(row: ShipmentEventRow) -> Self {
        Self {
            id: ShipmentEventId::new(row.id),
            order_id: OrderId::new(row.order_id),
            status: row.status,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

/// Repository for the append-only shipment timeline.
pub struct ShipmentEventRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShipmentEventRepository<'a> {
    /// Create a new shipment event repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Append an event to an order's timeline.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn append(
        conn: &mut PgConnection,
        order_id: OrderId,
        status: &str,
        note: Option<&str>,
    ) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO shop.shipment_events (order_id, status, note) VALUES ($1, $2, $3)",
        )
        .bind(order_id.as_i64())
        .bind(status)
        .bind(note)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// List an order's timeline, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self, order_id: OrderId) -> Result<Vec<ShipmentEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, ShipmentEventRow>(
            "SELECT id, order_id, status, note, created_at
             FROM shop.shipment_events
             WHERE order_id = $1
             ORDER BY created_at, id",
        )
        .bind(order_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
