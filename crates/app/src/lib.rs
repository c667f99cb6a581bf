//! Session shell: wires the access gate, the cart and the read-only views
//! together for one app session.
//!
//! The cart is owned by the shell and lent out explicitly; nothing here is
//! global. Every applied cart event is wrapped in an envelope and published
//! on the session's bus for projections such as the cart badge.

pub mod badge;
pub mod cart_handle;
pub mod config;
pub mod error;
pub mod shell;

pub use badge::CartBadgeProjection;
pub use cart_handle::{CartEnvelope, CartHandle};
pub use config::{AppConfig, ConfigError};
pub use error::ShellError;
pub use shell::{Shell, SharedCartBus};
