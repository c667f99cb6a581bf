//! Process-wide logging setup for the shell binary.
//!
//! Domain crates never log; only the composition layer emits `tracing` events.

pub mod tracing;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info";

/// Install the JSON subscriber. Calling it again is a no-op.
pub fn init() {
    tracing::init(DEFAULT_FILTER);
}
