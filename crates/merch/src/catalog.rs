use std::collections::HashSet;
use std::io::Read;

use core::str::FromStr;

use thiserror::Error;

use cashless_core::{DomainError, DomainResult};

use crate::item::{MerchCategory, MerchItem, ProductId};

/// Which categories the browse view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(MerchCategory),
}

impl CategoryFilter {
    pub fn matches(&self, item: &MerchItem) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => item.category == *category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(CategoryFilter::All);
        }
        s.parse().map(CategoryFilter::Only)
    }
}

/// Browse ordering. Every order is stable: ties keep catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Name, A-Z (case-insensitive).
    #[default]
    Alphabetical,
    PriceLowToHigh,
    PriceHighToLow,
    /// Items flagged new first.
    Newest,
}

impl FromStr for SortOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "alphabetically" => Ok(SortOrder::Alphabetical),
            "price-low" => Ok(SortOrder::PriceLowToHigh),
            "price-high" => Ok(SortOrder::PriceHighToLow),
            "newest" => Ok(SortOrder::Newest),
            other => Err(DomainError::validation(format!("unknown sort order: {other}"))),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("failed to parse catalog document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog rejected: {0}")]
    Invalid(#[from] DomainError),
}

/// The merch catalog, in the order it was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    items: Vec<MerchItem>,
}

impl Catalog {
    /// Build a catalog, rejecting blank ids/names and duplicate ids.
    pub fn new(items: Vec<MerchItem>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if item.id.as_str().trim().is_empty() {
                return Err(DomainError::validation("product id cannot be empty"));
            }
            if item.name.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "product {} has an empty name",
                    item.id
                )));
            }
            if !seen.insert(&item.id) {
                return Err(DomainError::conflict(format!(
                    "duplicate product id {}",
                    item.id
                )));
            }
        }
        Ok(Self { items })
    }

    /// Load a catalog from a JSON array of items.
    pub fn from_json_reader<R: Read>(reader: R) -> Result<Self, CatalogLoadError> {
        let items: Vec<MerchItem> = serde_json::from_reader(reader)?;
        Ok(Self::new(items)?)
    }

    pub fn items(&self) -> &[MerchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &ProductId) -> Option<&MerchItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// The browse view: filter by category, then order.
    pub fn browse(&self, filter: CategoryFilter, order: SortOrder) -> Vec<&MerchItem> {
        let mut items: Vec<&MerchItem> = self.items.iter().filter(|i| filter.matches(i)).collect();

        match order {
            SortOrder::Alphabetical => {
                items.sort_by_cached_key(|i| i.name.to_lowercase());
            }
            SortOrder::PriceLowToHigh => items.sort_by_key(|i| i.price),
            SortOrder::PriceHighToLow => items.sort_by(|a, b| b.price.cmp(&a.price)),
            SortOrder::Newest => items.sort_by_key(|i| !i.is_new),
        }

        items
    }
}
