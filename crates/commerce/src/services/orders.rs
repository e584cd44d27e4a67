//! The order status state machine and its side effects.
//!
//! Every transition is guard-then-act: the legality check happens against
//! the transition table in `driftwood-core` before any write, and the write
//! itself is a compare-and-swap so concurrent transitions cannot both apply.
//! Entering CANCELLED releases every reserved unit back to the stock ledger,
//! reading quantities from the immutable line item snapshots.

use chrono::{Duration, Utc};
use sqlx::PgPool;
use thiserror::Error;

use driftwood_core::{OrderId, OrderStatus, UserId};

use crate::db::{
    OrderRepository, RepositoryError, ShipmentEventRepository, StockLedger,
};
use crate::models::{Order, OrderFilter, OrderWithItems, ShipmentEvent};

/// Days between shipping and the stamped delivery estimate.
const ESTIMATED_TRANSIT_DAYS: i64 = 5;

/// Errors from order lifecycle operations.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("order not found")]
    NotFound,

    #[error("not authorized")]
    NotOwner,

    #[error("order cannot move from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },

    #[error("order can no longer be cancelled")]
    NotCancellable,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Applies the order state machine.
pub struct OrderLifecycleService<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderLifecycleService<'a> {
    /// Create a new order lifecycle service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get an order with items, without an ownership check (admin).
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist.
    pub async fn get(&self, order_id: OrderId) -> Result<OrderWithItems, OrderError> {
        OrderRepository::new(self.pool)
            .get_with_items(order_id)
            .await?
            .ok_or(OrderError::NotFound)
    }

    /// Get an order with items, enforcing ownership.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` if the order does not exist, or
    /// `OrderError::NotOwner` if it belongs to another user.
    pub async fn get_owned(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderWithItems, OrderError> {
        let order = self.get(order_id).await?;
        if order.order.user_id != user_id {
            return Err(OrderError::NotOwner);
        }
        Ok(order)
    }

    /// List orders matching a filter, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the query fails.
    pub async fn list(&self, filter: &OrderFilter) -> Result<(Vec<Order>, u64), OrderError> {
        Ok(OrderRepository::new(self.pool).list(filter).await?)
    }

    /// Fulfillment timeline for an owned order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` / `OrderError::NotOwner` per
    /// [`Self::get_owned`].
    pub async fn timeline_for(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<Vec<ShipmentEvent>, OrderError> {
        self.get_owned(user_id, order_id).await?;
        Ok(ShipmentEventRepository::new(self.pool).list(order_id).await?)
    }

    /// User-triggered cancellation.
    ///
    /// Users may only cancel while the order is PENDING or CONFIRMED - a
    /// narrower window than the transition table, which additionally lets
    /// admins cancel a PREPARING order.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotCancellable` outside the user window, plus
    /// the `get_owned` errors.
    pub async fn cancel(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderWithItems, OrderError> {
        let current = self.get_owned(user_id, order_id).await?;
        if !current.order.status.is_user_cancellable() {
            return Err(OrderError::NotCancellable);
        }
        self.apply_cancellation(&current).await?;
        self.get(order_id).await
    }

    /// Admin-triggered status transition.
    ///
    /// Accepts any transition the table allows. Entering SHIPPED stamps the
    /// delivery estimate (and an optional carrier tracking number); entering
    /// DELIVERED stamps the delivery timestamp, which unlocks returns;
    /// entering CANCELLED releases the order's reserved stock.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::IllegalTransition` for any pair outside the
    /// table, plus the `get` errors.
    pub async fn update_status(
        &self,
        order_id: OrderId,
        new_status: OrderStatus,
        tracking_number: Option<&str>,
    ) -> Result<OrderWithItems, OrderError> {
        let current = self.get(order_id).await?;
        let from = current.order.status;
        if !from.can_transition_to(new_status) {
            return Err(OrderError::IllegalTransition {
                from,
                to: new_status,
            });
        }

        match new_status {
            OrderStatus::Cancelled => self.apply_cancellation(&current).await?,
            OrderStatus::Shipped => {
                let estimated = Utc::now() + Duration::days(ESTIMATED_TRANSIT_DAYS);
                let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
                OrderRepository::set_shipped(&mut tx, order_id, from, tracking_number, estimated)
                    .await?;
                ShipmentEventRepository::append(
                    &mut tx,
                    order_id,
                    OrderStatus::Shipped.as_str(),
                    tracking_number,
                )
                .await?;
                tx.commit().await.map_err(RepositoryError::from)?;
            }
            OrderStatus::Delivered => {
                let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
                OrderRepository::set_delivered(&mut tx, order_id, from, Utc::now()).await?;
                ShipmentEventRepository::append(
                    &mut tx,
                    order_id,
                    OrderStatus::Delivered.as_str(),
                    None,
                )
                .await?;
                tx.commit().await.map_err(RepositoryError::from)?;
            }
            _ => {
                let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
                OrderRepository::set_status(&mut tx, order_id, from, new_status).await?;
                ShipmentEventRepository::append(&mut tx, order_id, new_status.as_str(), None)
                    .await?;
                tx.commit().await.map_err(RepositoryError::from)?;
            }
        }

        tracing::info!(%order_id, %from, to = %new_status, "order status updated");
        self.get(order_id).await
    }

    /// Cancel and restore stock in one transaction.
    ///
    /// Quantities come from the order's immutable line item snapshots, never
    /// from any mutable cart state, so the release always mirrors the
    /// original reservation exactly.
    async fn apply_cancellation(&self, current: &OrderWithItems) -> Result<(), OrderError> {
        let order_id = current.order.id;
        let from = current.order.status;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        OrderRepository::set_status(&mut tx, order_id, from, OrderStatus::Cancelled).await?;
        for item in &current.items {
            StockLedger::release(&mut tx, item.product_id, item.quantity).await?;
        }
        ShipmentEventRepository::append(
            &mut tx,
            order_id,
            OrderStatus::Cancelled.as_str(),
            None,
        )
        .await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %order_id,
            %from,
            lines = current.items.len(),
            "order cancelled, stock released"
        );
        Ok(())
    }
}
