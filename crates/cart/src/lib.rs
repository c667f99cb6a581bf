//! Shopping cart domain module.
//!
//! The cart is an aggregate: commands (`AddItem`, `UpdateQuantity`,
//! `RemoveItem`) are decided into events and applied synchronously. It keeps at
//! most one line per (product, variant) and derives its totals on demand.

pub mod cart;

pub use cart::{
    AddItem, Cart, CartCommand, CartEvent, CartId, LineItem, LineItemAdded, LineItemId,
    LineItemQuantityChanged, LineItemRemoved, RemoveItem, UpdateQuantity,
};
