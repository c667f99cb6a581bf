//! Merch store catalog.
//!
//! Read-only catalog items, the browse view's filter/sort rules and the size
//! selection check that runs before anything reaches the cart. No IO besides
//! parsing a catalog document handed in by the caller.

pub mod catalog;
pub mod item;
pub mod selection;

pub use catalog::{Catalog, CatalogLoadError, CategoryFilter, SortOrder};
pub use item::{MerchCategory, MerchItem, ProductId, ProductSnapshot, Variant};
pub use selection::select_variant;
