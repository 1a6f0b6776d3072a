//! Logging setup

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_filter` (e.g. `"this_common=info"`) when `RUST_LOG`
/// is unset or invalid. Calling it again once a subscriber exists is a no-op,
/// so tests and binaries can both call it freely.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_tracing_is_idempotent() {
        init_tracing("this_common=debug");
        init_tracing("this_common=debug");
        tracing::debug!("subscriber installed");
    }
}
