//! Test log output
//!
//! Set `RUST_LOG=custody_ledger=debug` to see verification steps.

use once_cell::sync::Lazy;
use tracing_subscriber::EnvFilter;

static TRACING: Lazy<()> = Lazy::new(|| {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    // Another harness may already own the global subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
});

/// Install the test subscriber once per process
pub fn init_tracing() {
    Lazy::force(&TRACING);
}
