//! Logging infrastructure for Siqi.
//!
//! Centralized tracing setup shared by all binaries.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging with sensible defaults
///
/// Default level is WARN so analysis output stays clean on a terminal;
/// override with the RUST_LOG environment variable for more detail.
pub fn init() {
    init_with_level("warn")
}

/// Initialize logging with a specific default level
///
/// `default_level` is one of debug, info, warn, error. RUST_LOG still wins
/// when set.
pub fn init_with_level(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_target(false))
        .init();
}
