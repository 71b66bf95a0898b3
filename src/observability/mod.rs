//! Observability for logspool
//!
//! - Structured logging through `tracing`
//! - Spool counters ([`MetricsRegistry`])
//!
//! Observability is read-only: nothing here influences the spool protocol.

mod metrics;

pub use metrics::{MetricsRegistry, MetricsSnapshot};

use tracing_subscriber::EnvFilter;

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` wins over `default_level` when set. Calling this twice is
/// harmless; the second call reports an error that callers may ignore.
pub fn init_tracing(default_level: &str) -> Result<(), String> {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(directives),
        _ => EnvFilter::try_new(format!("hyper=off,h2=off,{}", default_level)),
    }
    .map_err(|e| format!("invalid log filter: {}", e))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_level(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .try_init()
        .map_err(|e| format!("failed to install subscriber: {}", e))
}
