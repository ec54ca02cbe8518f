//! Structured logging initialization via `tracing`.

use tracing_subscriber::EnvFilter;

/// Initialize the tracing subscriber for a node process.
///
/// `default_directive` is the filter configured through the node config or
/// CLI (e.g. "info", or a full directive like "meridian_node=debug").
/// When `RUST_LOG` is set in the environment it takes precedence.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
