//! The engine's services: checkout commitment, order lifecycle, returns.
//!
//! Services own every business rule; repositories only persist what a
//! service has already validated. Each public operation is one logical unit
//! of work - the only multi-step mutations (checkout, cancellation, restock)
//! run inside a single transaction.

pub mod checkout;
pub mod orders;
pub mod returns;

pub use checkout::{CheckoutError, CheckoutService};
pub use orders::{OrderError, OrderLifecycleService};
pub use returns::{ReturnError, ReturnService};
