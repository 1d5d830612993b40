#![cfg(test)]

//! One-time tracing setup shared by every unit test in the crate.

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install a quiet test-writer subscriber. Idempotent.
///
/// Level precedence: `TEST_LOG`, then `RUST_LOG`, then `warn`.
///
/// ```text
/// TEST_LOG=debug cargo test -p landlord-backend room::
/// ```
pub fn init() {
    INITIALIZED.get_or_init(|| {
        let filter = std::env::var("TEST_LOG")
            .or_else(|_| std::env::var("RUST_LOG"))
            .map(EnvFilter::new)
            .unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .without_time()
            .try_init()
            .ok();
    });
}
