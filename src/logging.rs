//! Tracing subscriber setup
//!
//! Statements are logged at `debug` by the stores, pool and schema events at `info`.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Install a JSON subscriber filtered by `RUST_LOG`, else `default_filter`.
///
/// Returns false when a global subscriber was already installed.
pub fn init(default_filter: &str) -> bool {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok()
}

/// Plain-text subscriber routed through the test harness's captured output
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "scriptorium=debug".into()))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
