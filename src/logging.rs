//! Tracing setup for host applications that have no subscriber of their own.

use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install a formatted subscriber filtered by `RUST_LOG` (default `info`).
/// Safe to call when a subscriber is already set; the call becomes a no-op.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_filter(env_filter))
        .try_init();
    if result.is_ok() {
        debug!("Logging initialized; override level with RUST_LOG");
    }
}
