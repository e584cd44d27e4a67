//! Domain models for the commerce engine.
//!
//! Orders, line items, and return lines are *snapshots*: they copy product
//! name and unit price at commitment time and are never backed by a live
//! read of the catalog row, so later price or catalog edits cannot alter
//! history.

pub mod address;
pub mod cart;
pub mod order;
pub mod product;
pub mod returns;
pub mod shipment;

pub use address::Address;
pub use cart::{CartEntry, CartLine};
pub use order::{
    CheckoutInput, NewOrder, NewOrderItem, Order, OrderFilter, OrderItem, OrderSort,
    OrderWithItems,
};
pub use product::{NewProduct, Product};
pub use returns::{
    NewReturn, Return, ReturnFilter, ReturnItem, ReturnRequestItem, ReturnWithItems, RestockLine,
};
pub use shipment::ShipmentEvent;
