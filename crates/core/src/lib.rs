//! `cashless-core` — domain building blocks shared by every fan-club module.
//!
//! This crate contains **pure domain** primitives (no IO, no rendering, no clocks).

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{AggregateId, SessionId};
pub use money::Money;
pub use value_object::ValueObject;
