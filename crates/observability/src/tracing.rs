//! Subscriber wiring: JSON lines, timestamps, `RUST_LOG` filtering.

use tracing_subscriber::EnvFilter;

/// Install a JSON `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_filter`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_current_span(false)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    #[test]
    fn second_init_is_a_no_op() {
        super::init("debug");
        assert!(!super::init("debug"));
        ::tracing::info!(check = true, "still logging after repeat init");
    }
}
