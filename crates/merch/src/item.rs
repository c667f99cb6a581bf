use core::str::FromStr;

use serde::{Deserialize, Serialize};

use cashless_core::{DomainError, Money, ValueObject};

/// Catalog product identifier (stable string, unique within a catalog).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProductId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DomainError::invalid_id("ProductId: empty"));
        }
        Ok(Self(s.to_string()))
    }
}

/// A product sub-selector such as a size ("M", "XL").
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Variant(String);

impl Variant {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Variant {}

impl core::fmt::Display for Variant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Merch category, as used by the browse filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MerchCategory {
    Clothing,
    Accessories,
    Beats,
    Limited,
}

impl MerchCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MerchCategory::Clothing => "clothing",
            MerchCategory::Accessories => "accessories",
            MerchCategory::Beats => "beats",
            MerchCategory::Limited => "limited",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MerchCategory::Clothing => "Clothing",
            MerchCategory::Accessories => "Accessories",
            MerchCategory::Beats => "Beats",
            MerchCategory::Limited => "Limited Edition",
        }
    }
}

impl FromStr for MerchCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "clothing" => Ok(MerchCategory::Clothing),
            "accessories" => Ok(MerchCategory::Accessories),
            "beats" => Ok(MerchCategory::Beats),
            "limited" => Ok(MerchCategory::Limited),
            other => Err(DomainError::validation(format!(
                "unknown merch category: {other}"
            ))),
        }
    }
}

/// A catalog entry. Read-only from the cart's point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerchItem {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub description: String,
    pub category: MerchCategory,
    /// Offered sizes in display order; empty when the item has no size.
    #[serde(default)]
    pub sizes: Vec<String>,
    /// Informational only; adding to the cart never decrements it.
    pub stock: u32,
    #[serde(default)]
    pub is_new: bool,
}

impl MerchItem {
    pub fn has_variants(&self) -> bool {
        !self.sizes.is_empty()
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }

    /// Freeze the fields a cart line needs. Later catalog edits do not reach
    /// lines created from an earlier snapshot.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            product_id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.price,
        }
    }
}

/// The part of a catalog item captured by a cart line at add time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Money,
}

impl ProductSnapshot {
    pub fn new(product_id: ProductId, name: impl Into<String>, unit_price: Money) -> Self {
        Self {
            product_id,
            name: name.into(),
            unit_price,
        }
    }
}
