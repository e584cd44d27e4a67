//! The return/refund state machine for delivered orders.
//!
//! A return references its order; it never owns it. Creation guards run in a
//! fixed sequence (existence, ownership, delivered, no open return, line
//! validation) before anything is written, and the refund amount is computed
//! exactly once at creation from the order's immutable line item snapshots -
//! mirroring the order's own compute-once totals.
//!
//! Refunding and restocking are deliberately separate actions: a refund
//! moves money state only, and returned goods re-enter stock through an
//! explicit admin restock once they have been inspected.

use chrono::Utc;
use sqlx::PgPool;
use thiserror::Error;

use driftwood_core::{OrderId, OrderItemId, OrderStatus, ReturnId, ReturnStatus, UserId};

use crate::db::{OrderRepository, RepositoryError, ReturnRepository, StockLedger};
use crate::models::{NewReturn, Return, ReturnFilter, ReturnRequestItem, ReturnWithItems};
use crate::numbers;

/// Errors from return lifecycle operations.
#[derive(Debug, Error)]
pub enum ReturnError {
    #[error("return not found")]
    NotFound,

    #[error("order not found")]
    OrderNotFound,

    #[error("not authorized")]
    NotOwner,

    #[error("order has not been delivered")]
    OrderNotDelivered,

    #[error("order already has an open return")]
    ReturnAlreadyExists,

    #[error("no line items requested")]
    NoItems,

    #[error("line item {order_item_id} does not belong to the order")]
    UnknownLineItem { order_item_id: OrderItemId },

    #[error("line item {order_item_id} listed more than once")]
    DuplicateLineItem { order_item_id: OrderItemId },

    #[error("invalid quantity for line item {order_item_id}")]
    InvalidQuantity { order_item_id: OrderItemId },

    #[error(
        "requested quantity {requested} exceeds original quantity {original} \
         for line item {order_item_id}"
    )]
    QuantityExceedsOriginal {
        order_item_id: OrderItemId,
        requested: i32,
        original: i32,
    },

    #[error("return must be verified before it can be refunded")]
    ReturnNotVerified,

    #[error("use the refund operation to mark a return refunded")]
    RefundRequiresProcess,

    #[error("return cannot move from {from} to {to}")]
    IllegalTransition {
        from: ReturnStatus,
        to: ReturnStatus,
    },

    #[error("return cannot be restocked while {status}")]
    NotRestockable { status: ReturnStatus },

    #[error("return already restocked")]
    AlreadyRestocked,

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Applies the return/refund state machine.
pub struct ReturnService<'a> {
    pool: &'a PgPool,
}

impl<'a> ReturnService<'a> {
    /// Create a new return service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Open a return against a delivered order.
    ///
    /// Guards, in order: order exists; caller owns it; order is DELIVERED;
    /// no open return exists; at least one line requested; every line belongs
    /// to the order, appears once, and requests a positive quantity no larger
    /// than the original. Only then is anything written.
    ///
    /// # Errors
    ///
    /// One typed variant per violated guard; `ReturnError::Repository` for
    /// storage failures.
    pub async fn create(
        &self,
        user_id: UserId,
        order_id: OrderId,
        items: Vec<ReturnRequestItem>,
        reason: String,
        refund_method: String,
    ) -> Result<ReturnWithItems, ReturnError> {
        let orders = OrderRepository::new(self.pool);
        let order = orders.get(order_id).await?.ok_or(ReturnError::OrderNotFound)?;
        if order.user_id != user_id {
            return Err(ReturnError::NotOwner);
        }
        if order.status != OrderStatus::Delivered {
            return Err(ReturnError::OrderNotDelivered);
        }

        let returns = ReturnRepository::new(self.pool);
        if returns.find_open_for_order(order_id).await?.is_some() {
            return Err(ReturnError::ReturnAlreadyExists);
        }

        if items.is_empty() {
            return Err(ReturnError::NoItems);
        }

        let order_items = orders.items(order_id).await?;
        let mut seen: Vec<OrderItemId> = Vec::with_capacity(items.len());
        let mut refund_amount = rust_decimal::Decimal::ZERO;
        for requested in &items {
            let Some(original) = order_items
                .iter()
                .find(|item| item.id == requested.order_item_id)
            else {
                return Err(ReturnError::UnknownLineItem {
                    order_item_id: requested.order_item_id,
                });
            };
            if seen.contains(&requested.order_item_id) {
                return Err(ReturnError::DuplicateLineItem {
                    order_item_id: requested.order_item_id,
                });
            }
            seen.push(requested.order_item_id);
            if requested.quantity <= 0 {
                return Err(ReturnError::InvalidQuantity {
                    order_item_id: requested.order_item_id,
                });
            }
            if requested.quantity > original.quantity {
                return Err(ReturnError::QuantityExceedsOriginal {
                    order_item_id: requested.order_item_id,
                    requested: requested.quantity,
                    original: original.quantity,
                });
            }
            refund_amount += original.unit_price * rust_decimal::Decimal::from(requested.quantity);
        }

        let new_return = NewReturn {
            order_id,
            user_id,
            return_number: numbers::return_number(),
            reason,
            refund_amount,
            refund_method,
        };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        let created = ReturnRepository::insert(&mut tx, &new_return, &items)
            .await
            .map_err(|err| match err {
                // Two concurrent creations raced; the partial unique index
                // caught the loser.
                RepositoryError::Conflict(_) => ReturnError::ReturnAlreadyExists,
                other => ReturnError::Repository(other),
            })?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            return_number = %created.ret.return_number,
            %order_id,
            refund_amount = %created.ret.refund_amount,
            "return requested"
        );
        Ok(created)
    }

    /// Get a return with lines, without an ownership check (admin).
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::NotFound` if the return does not exist.
    pub async fn get(&self, return_id: ReturnId) -> Result<ReturnWithItems, ReturnError> {
        ReturnRepository::new(self.pool)
            .get_with_items(return_id)
            .await?
            .ok_or(ReturnError::NotFound)
    }

    /// Get a return with lines, enforcing ownership.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::NotFound` / `ReturnError::NotOwner`.
    pub async fn get_owned(
        &self,
        user_id: UserId,
        return_id: ReturnId,
    ) -> Result<ReturnWithItems, ReturnError> {
        let ret = self.get(return_id).await?;
        if ret.ret.user_id != user_id {
            return Err(ReturnError::NotOwner);
        }
        Ok(ret)
    }

    /// List returns matching a filter, with the total match count.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::Repository` if the query fails.
    pub async fn list(&self, filter: &ReturnFilter) -> Result<(Vec<Return>, u64), ReturnError> {
        Ok(ReturnRepository::new(self.pool).list(filter).await?)
    }

    /// Attach the customer's return-shipment tracking number.
    ///
    /// Only legal while the return is REQUESTED; moves it to IN_TRANSIT.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::IllegalTransition` from any other status, plus
    /// the `get_owned` errors.
    pub async fn attach_tracking(
        &self,
        user_id: UserId,
        return_id: ReturnId,
        tracking_number: &str,
    ) -> Result<ReturnWithItems, ReturnError> {
        let current = self.get_owned(user_id, return_id).await?;
        if current.ret.status != ReturnStatus::Requested {
            return Err(ReturnError::IllegalTransition {
                from: current.ret.status,
                to: ReturnStatus::InTransit,
            });
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ReturnRepository::set_tracking(&mut tx, return_id, tracking_number).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        self.get(return_id).await
    }

    /// Admin-triggered status transition.
    ///
    /// Accepts any transition the table allows except REFUNDED, which is
    /// reserved for the explicit refund operation so the refund timestamp
    /// cannot be skipped.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::RefundRequiresProcess` for REFUNDED,
    /// `ReturnError::IllegalTransition` for pairs outside the table, plus
    /// the `get` errors.
    pub async fn update_status(
        &self,
        return_id: ReturnId,
        new_status: ReturnStatus,
        admin_notes: Option<&str>,
    ) -> Result<ReturnWithItems, ReturnError> {
        let current = self.get(return_id).await?;
        let from = current.ret.status;

        if new_status == ReturnStatus::Refunded {
            return Err(ReturnError::RefundRequiresProcess);
        }
        if !from.can_transition_to(new_status) {
            return Err(ReturnError::IllegalTransition {
                from,
                to: new_status,
            });
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ReturnRepository::set_status(&mut tx, return_id, from, new_status, admin_notes).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%return_id, %from, to = %new_status, "return status updated");
        self.get(return_id).await
    }

    /// Process the refund for a VERIFIED return.
    ///
    /// Moves the return to REFUNDED and stamps the refund timestamp. Does
    /// NOT restock: returned inventory re-enters stock only through the
    /// explicit [`Self::restock`] action.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::ReturnNotVerified` from any other status, plus
    /// the `get` errors.
    pub async fn process_refund(&self, return_id: ReturnId) -> Result<ReturnWithItems, ReturnError> {
        let current = self.get(return_id).await?;
        if current.ret.status != ReturnStatus::Verified {
            return Err(ReturnError::ReturnNotVerified);
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ReturnRepository::mark_refunded(&mut tx, return_id, Utc::now()).await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            %return_id,
            refund_amount = %current.ret.refund_amount,
            "return refunded"
        );
        self.get(return_id).await
    }

    /// Explicitly restock a verified or refunded return's goods.
    ///
    /// Separate from refunding on purpose: goods re-enter stock only after
    /// physical inspection. Legal at most once per return.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::NotRestockable` before verification and
    /// `ReturnError::AlreadyRestocked` on a repeat, plus the `get` errors.
    pub async fn restock(&self, return_id: ReturnId) -> Result<ReturnWithItems, ReturnError> {
        let current = self.get(return_id).await?;
        let status = current.ret.status;
        if !matches!(status, ReturnStatus::Verified | ReturnStatus::Refunded) {
            return Err(ReturnError::NotRestockable { status });
        }
        if current.ret.restocked_at.is_some() {
            return Err(ReturnError::AlreadyRestocked);
        }

        let lines = ReturnRepository::new(self.pool).restock_lines(return_id).await?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ReturnRepository::mark_restocked(&mut tx, return_id)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => ReturnError::AlreadyRestocked,
                other => ReturnError::Repository(other),
            })?;
        for line in &lines {
            StockLedger::release(&mut tx, line.product_id, line.quantity).await?;
        }
        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(%return_id, lines = lines.len(), "return restocked");
        self.get(return_id).await
    }

    /// User-triggered cancellation of an open return.
    ///
    /// # Errors
    ///
    /// Returns `ReturnError::IllegalTransition` once the return is terminal,
    /// plus the `get_owned` errors.
    pub async fn cancel(
        &self,
        user_id: UserId,
        return_id: ReturnId,
    ) -> Result<ReturnWithItems, ReturnError> {
        let current = self.get_owned(user_id, return_id).await?;
        let from = current.ret.status;
        if !from.can_transition_to(ReturnStatus::Cancelled) {
            return Err(ReturnError::IllegalTransition {
                from,
                to: ReturnStatus::Cancelled,
            });
        }

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;
        ReturnRepository::set_status(&mut tx, return_id, from, ReturnStatus::Cancelled, None)
            .await?;
        tx.commit().await.map_err(RepositoryError::from)?;

        self.get(return_id).await
    }
}
