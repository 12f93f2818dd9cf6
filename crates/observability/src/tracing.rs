//! Subscriber installation.
//!
//! Verbosity comes from `RUST_LOG`; without it, `info` for everything and
//! `debug` for the workspace's own crates.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_DIRECTIVES: &str = "info,agrointel_app=debug,agrointel_ai=debug";

pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

/// JSON lines with timestamps. Subsequent calls are no-ops.
pub fn init_json() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

/// Coloured multi-line output. Subsequent calls are no-ops.
pub fn init_pretty() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .pretty()
        .try_init();
}
