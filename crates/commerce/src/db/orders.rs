//! Database operations for orders and their line item snapshots.
//!
//! Orders are immutable after commitment except for `status`,
//! `tracking_number`, and the delivery timestamps. Every status write here is
//! a compare-and-swap on the expected current status, so two concurrent
//! transitions cannot both apply; the losing writer gets
//! `RepositoryError::Conflict`.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};

use driftwood_core::{OrderId, OrderItemId, OrderStatus, ProductId, UserId};

use super::RepositoryError;
use crate::models::{
    Address, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderSort, OrderWithItems,
};

/// Internal row type for order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    order_number: String,
    user_id: i64,
    shipping_address: Json<Address>,
    billing_address: Option<Json<Address>>,
    subtotal: Decimal,
    shipping_fee: Decimal,
    discount: Decimal,
    total: Decimal,
    payment_method: String,
    status: String,
    tracking_number: Option<String>,
    notes: Option<String>,
    estimated_delivery_at: Option<DateTime<Utc>>,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status =
            OrderStatus::from_str(&row.status).map_err(RepositoryError::DataCorruption)?;
        Ok(Self {
            id: OrderId::new(row.id),
            order_number: row.order_number,
            user_id: UserId::new(row.user_id),
            shipping_address: row.shipping_address.0,
            billing_address: row.billing_address.map(|a| a.0),
            subtotal: row.subtotal,
            shipping_fee: row.shipping_fee,
            discount: row.discount,
            total: row.total,
            payment_method: row.payment_method,
            status,
            tracking_number: row.tracking_number,
            notes: row.notes,
            estimated_delivery_at: row.estimated_delivery_at,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
        })
    }
}

/// Internal row type for order item queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    product_id: i64,
    product_name: String,
    unit_price: Decimal,
    quantity: i32,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            unit_price: row.unit_price,
            quantity: row.quantity,
        }
    }
}

const ORDER_COLUMNS: &str = "id, order_number, user_id, shipping_address, billing_address, \
     subtotal, shipping_fee, discount, total, payment_method, status, \
     tracking_number, notes, estimated_delivery_at, delivered_at, created_at";

const ITEM_COLUMNS: &str = "id, order_id, product_id, product_name, unit_price, quantity";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Commitment writes (transaction-scoped)
    // =========================================================================

    /// Insert the order row inside the commitment transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order number collides.
    pub async fn insert(
        conn: &mut PgConnection,
        order: &NewOrder,
    ) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO shop.orders (
                order_number, user_id, shipping_address, billing_address,
                subtotal, shipping_fee, discount, total, payment_method, notes
             )
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(&order.order_number)
        .bind(order.user_id.as_i64())
        .bind(Json(&order.shipping_address))
        .bind(order.billing_address.as_ref().map(Json))
        .bind(order.subtotal)
        .bind(order.shipping_fee)
        .bind(order.discount)
        .bind(order.total)
        .bind(&order.payment_method)
        .bind(&order.notes)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some("orders_order_number_key")
            {
                return RepositoryError::Conflict("order number already exists".to_string());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }

    /// Insert the line item snapshots inside the commitment transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn insert_items(
        conn: &mut PgConnection,
        order_id: OrderId,
        items: &[NewOrderItem],
    ) -> Result<Vec<OrderItem>, RepositoryError> {
        let mut inserted = Vec::with_capacity(items.len());
        for item in items {
            let row = sqlx::query_as::<_, OrderItemRow>(&format!(
                "INSERT INTO shop.order_items
                    (order_id, product_id, product_name, unit_price, quantity)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {ITEM_COLUMNS}"
            ))
            .bind(order_id.as_i64())
            .bind(item.product_id.as_i64())
            .bind(&item.product_name)
            .bind(item.unit_price)
            .bind(item.quantity)
            .fetch_one(&mut *conn)
            .await?;
            inserted.push(row.into());
        }
        Ok(inserted)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Get an order's line item snapshots.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: OrderId) -> Result<Vec<OrderItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM shop.order_items WHERE order_id = $1 ORDER BY id"
        ))
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an order hydrated with its line items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn get_with_items(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderWithItems>, RepositoryError> {
        let Some(order) = self.get(id).await? else {
            return Ok(None);
        };
        let items = self.items(id).await?;
        Ok(Some(OrderWithItems { order, items }))
    }

    /// List orders matching a filter, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<(Vec<Order>, u64), RepositoryError> {
        let status = filter.status.map(|s| s.as_str().to_string());
        let user_id = filter.user_id.as_ref().map(UserId::as_i64);
        let order_by = match filter.sort {
            OrderSort::Newest => "created_at DESC",
            OrderSort::Oldest => "created_at ASC",
        };

        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR user_id = $2)
             ORDER BY {order_by}
             LIMIT $3 OFFSET $4"
        ))
        .bind(&status)
        .bind(user_id)
        .bind(i64::from(filter.per_page))
        .bind(filter.offset())
        .fetch_all(self.pool)
        .await?;

        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM shop.orders
             WHERE ($1::text IS NULL OR status = $1)
               AND ($2::bigint IS NULL OR user_id = $2)",
        )
        .bind(&status)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;

        let orders = rows
            .into_iter()
            .map(TryInto::try_into)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((orders, total.try_into().unwrap_or(0)))
    }

    // =========================================================================
    // Status writes (compare-and-swap on the expected current status)
    // =========================================================================

    /// Move an order from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order was concurrently
    /// moved out of `from`.
    pub async fn set_status(
        conn: &mut PgConnection,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        let result =
            sqlx::query("UPDATE shop.orders SET status = $3 WHERE id = $1 AND status = $2")
                .bind(id.as_i64())
                .bind(from.as_str())
                .bind(to.as_str())
                .execute(&mut *conn)
                .await?;

        Self::check_swapped(result.rows_affected(), from, to)
    }

    /// Move an order to SHIPPED, stamping the delivery estimate and an
    /// optional carrier tracking number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order was concurrently
    /// moved out of `from`.
    pub async fn set_shipped(
        conn: &mut PgConnection,
        id: OrderId,
        from: OrderStatus,
        tracking_number: Option<&str>,
        estimated_delivery_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders
             SET status = $3,
                 tracking_number = COALESCE($4, tracking_number),
                 estimated_delivery_at = $5
             WHERE id = $1 AND status = $2",
        )
        .bind(id.as_i64())
        .bind(from.as_str())
        .bind(OrderStatus::Shipped.as_str())
        .bind(tracking_number)
        .bind(estimated_delivery_at)
        .execute(&mut *conn)
        .await?;

        Self::check_swapped(result.rows_affected(), from, OrderStatus::Shipped)
    }

    /// Move an order to DELIVERED, stamping the delivery timestamp.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the order was concurrently
    /// moved out of `from`.
    pub async fn set_delivered(
        conn: &mut PgConnection,
        id: OrderId,
        from: OrderStatus,
        delivered_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE shop.orders
             SET status = $3, delivered_at = $4
             WHERE id = $1 AND status = $2",
        )
        .bind(id.as_i64())
        .bind(from.as_str())
        .bind(OrderStatus::Delivered.as_str())
        .bind(delivered_at)
        .execute(&mut *conn)
        .await?;

        Self::check_swapped(result.rows_affected(), from, OrderStatus::Delivered)
    }

    fn check_swapped(
        rows_affected: u64,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<(), RepositoryError> {
        if rows_affected == 0 {
            return Err(RepositoryError::Conflict(format!(
                "order left {from} before the transition to {to} applied"
            )));
        }
        Ok(())
    }
}
