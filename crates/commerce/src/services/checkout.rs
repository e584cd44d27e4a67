//! The order commitment engine: turn a cart into an order, atomically.
//!
//! Commitment is the only forward-path writer that decrements stock. The
//! whole of step two - order row, line item snapshots, one reservation per
//! line, cart consumption - happens inside a single transaction, so a
//! failure anywhere leaves no partial order, no partial decrement, and the
//! cart intact.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use driftwood_core::{ProductId, UserId};

use crate::db::{
    CartRepository, OrderRepository, ProductRepository, RepositoryError, StockError, StockLedger,
};
use crate::models::{CheckoutInput, NewOrder, NewOrderItem, OrderWithItems};
use crate::numbers;
use crate::pricing::{self, OrderTotals};

/// Errors from cart-to-order commitment.
///
/// Everything except `Repository` is caller-correctable and surfaced
/// verbatim, naming the offending product.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("cart is empty")]
    CartEmpty,

    #[error("product \"{name}\" is not available")]
    ProductUnavailable { product_id: ProductId, name: String },

    #[error("insufficient stock for \"{name}\"")]
    InsufficientStock { product_id: ProductId, name: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// The order commitment engine.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Commit the user's cart into an order.
    ///
    /// Validation (sellable, sufficient stock) runs before any mutation; the
    /// conditional reservation inside the transaction then re-enforces both
    /// against concurrent commitments, so passing validation here never
    /// guarantees the reservation - it only makes the common path cheap and
    /// the error messages precise.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::CartEmpty` when there is nothing to commit
    /// - `CheckoutError::ProductUnavailable` when a staged product is missing
    ///   or unsellable
    /// - `CheckoutError::InsufficientStock` when a staged quantity exceeds
    ///   available stock
    /// - `CheckoutError::Repository` for storage failures
    pub async fn commit(
        &self,
        user_id: UserId,
        input: CheckoutInput,
    ) -> Result<OrderWithItems, CheckoutError> {
        let entries = CartRepository::new(self.pool).list_entries(user_id).await?;
        if entries.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }

        // Guard pass: fail the whole commitment on the first bad line.
        let products = ProductRepository::new(self.pool);
        let mut items = Vec::with_capacity(entries.len());
        for entry in &entries {
            let Some(product) = products.get(entry.product_id).await? else {
                return Err(CheckoutError::ProductUnavailable {
                    product_id: entry.product_id,
                    name: format!("#{}", entry.product_id),
                });
            };
            if !product.sellable {
                return Err(CheckoutError::ProductUnavailable {
                    product_id: product.id,
                    name: product.name,
                });
            }
            if entry.quantity > product.stock {
                return Err(CheckoutError::InsufficientStock {
                    product_id: product.id,
                    name: product.name,
                });
            }
            items.push(NewOrderItem {
                product_id: product.id,
                product_name: product.name.clone(),
                unit_price: pricing::effective_unit_price(product.price, product.promo_price),
                quantity: entry.quantity,
            });
        }

        let subtotal: Decimal = items
            .iter()
            .map(|item| item.unit_price * Decimal::from(item.quantity))
            .sum();
        let totals = pricing::totals(subtotal, input.discount);

        // Order numbers are unique by index; on the rare collision, retry the
        // whole transaction once with a fresh suffix.
        match self.try_commit(user_id, &input, &totals, &items).await {
            Err(CheckoutError::Repository(RepositoryError::Conflict(message))) => {
                tracing::warn!(%message, "order number collision, retrying");
                self.try_commit(user_id, &input, &totals, &items).await
            }
            other => other,
        }
    }

    /// One attempt at the atomic commitment transaction.
    async fn try_commit(
        &self,
        user_id: UserId,
        input: &CheckoutInput,
        totals: &OrderTotals,
        items: &[NewOrderItem],
    ) -> Result<OrderWithItems, CheckoutError> {
        let new_order = NewOrder {
            order_number: numbers::order_number(),
            user_id,
            shipping_address: input.shipping_address.clone(),
            billing_address: input.billing_address.clone(),
            subtotal: totals.subtotal,
            shipping_fee: totals.shipping_fee,
            discount: totals.discount,
            total: totals.total,
            payment_method: input.payment_method.clone(),
            notes: input.notes.clone(),
        };

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let order = OrderRepository::insert(&mut tx, &new_order).await?;
        let inserted = OrderRepository::insert_items(&mut tx, order.id, items).await?;

        for item in items {
            StockLedger::reserve(&mut tx, item.product_id, item.quantity)
                .await
                .map_err(|err| map_stock_error(err, items))?;
        }

        let consumed = CartRepository::consume(&mut tx, user_id).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        tracing::info!(
            order_number = %order.order_number,
            %user_id,
            lines = inserted.len(),
            cart_rows = consumed,
            total = %order.total,
            "order committed"
        );

        Ok(OrderWithItems {
            order,
            items: inserted,
        })
    }
}

/// Translate a reservation failure into a checkout error naming the product.
fn map_stock_error(err: StockError, items: &[NewOrderItem]) -> CheckoutError {
    let name_of = |product_id: ProductId| {
        items
            .iter()
            .find(|item| item.product_id == product_id)
            .map_or_else(|| format!("#{product_id}"), |item| item.product_name.clone())
    };

    match err {
        StockError::Insufficient { product_id } => CheckoutError::InsufficientStock {
            product_id,
            name: name_of(product_id),
        },
        StockError::Unavailable { product_id } => CheckoutError::ProductUnavailable {
            product_id,
            name: name_of(product_id),
        },
        StockError::Repository(err) => CheckoutError::Repository(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: i64, name: &str) -> NewOrderItem {
        NewOrderItem {
            product_id: ProductId::new(id),
            product_name: name.to_string(),
            unit_price: Decimal::from(10),
            quantity: 1,
        }
    }

    #[test]
    fn test_stock_error_mapping_names_the_product() {
        let items = [item(1, "Walnut Tray"), item(2, "Brass Hook")];

        let err = map_stock_error(
            StockError::Insufficient {
                product_id: ProductId::new(2),
            },
            &items,
        );
        assert!(matches!(
            err,
            CheckoutError::InsufficientStock { ref name, .. } if name == "Brass Hook"
        ));

        let err = map_stock_error(
            StockError::Unavailable {
                product_id: ProductId::new(1),
            },
            &items,
        );
        assert_eq!(err.to_string(), "product \"Walnut Tray\" is not available");
    }

    #[test]
    fn test_stock_error_mapping_unknown_product_falls_back_to_id() {
        let err = map_stock_error(
            StockError::Insufficient {
                product_id: ProductId::new(9),
            },
            &[],
        );
        assert_eq!(err.to_string(), "insufficient stock for \"#9\"");
    }
}
