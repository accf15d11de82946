//! Structured logging for the OMS engine.
//!
//! `RUST_LOG` wins when set; otherwise the configured default filter is
//! used. Spans of interest: order placement, venue routing, fill
//! ingestion, and reconcile passes all log with `order_id` fields.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
