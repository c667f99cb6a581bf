//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Two value objects with the same attributes are interchangeable: two
/// `Money::from_cents(499)` are the same price, two `"M"` variants are the same
/// size. Contrast with [`crate::Entity`], where a line item keeps its identity
/// while its quantity changes.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Variant(String);
///
/// impl ValueObject for Variant {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
