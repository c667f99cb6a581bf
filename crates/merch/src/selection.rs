//! Size selection check performed by the browse view before adding to the cart.
//!
//! The cart itself accepts any variant; this is where "out of stock" and
//! "select a size" are enforced.

use cashless_core::{DomainError, DomainResult};

use crate::item::{MerchItem, Variant};

/// Validate the user's size choice for `item` and produce the variant to add.
///
/// An empty or whitespace-only choice counts as "no size chosen".
pub fn select_variant(item: &MerchItem, chosen: Option<&str>) -> DomainResult<Option<Variant>> {
    if !item.in_stock() {
        return Err(DomainError::validation(format!("{} is out of stock", item.name)));
    }

    let chosen = chosen.map(str::trim).filter(|s| !s.is_empty());

    match chosen {
        None if item.has_variants() => Err(DomainError::validation(format!(
            "select a size for {}",
            item.name
        ))),
        None => Ok(None),
        Some(size) if item.sizes.iter().any(|s| s == size) => Ok(Some(Variant::new(size))),
        Some(size) if item.has_variants() => Err(DomainError::validation(format!(
            "size {size} is not offered for {}",
            item.name
        ))),
        Some(size) => Err(DomainError::validation(format!(
            "{} has no sizes (got {size})",
            item.name
        ))),
    }
}
