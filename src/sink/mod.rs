//! Downstream consumers of drained batches
//!
//! The drain side hands every decoded batch to a [`Sink`]. Success means the
//! batch is durably handled downstream; failure keeps the batch on disk for
//! the next cycle. Delivery is at-least-once, so a sink may see the same
//! batch again after a failure or a crash.

mod file;
mod memory;
mod printer;

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::entry::LogEntry;

pub use file::FileSink;
pub use memory::MemorySink;
pub use printer::PrinterSink;

/// Result type for sink delivery
pub type SinkResult<T> = Result<T, SinkError>;

/// Delivery failure reported by a sink
#[derive(Debug, Error)]
pub enum SinkError {
    /// Downstream refused the batch
    #[error("sink rejected batch: {0}")]
    Rejected(String),

    /// Downstream temporarily unreachable
    #[error("sink unavailable: {0}")]
    Unavailable(String),

    #[error("sink failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl SinkError {
    /// Stable error code for logs
    pub fn code(&self) -> &'static str {
        match self {
            SinkError::Rejected(_) => "LOGSPOOL_SINK_REJECTED",
            SinkError::Unavailable(_) => "LOGSPOOL_SINK_UNAVAILABLE",
            SinkError::Io { .. } => "LOGSPOOL_SINK_IO",
        }
    }
}

/// A consumer of decoded log batches.
///
/// Implementations must tolerate redelivery of a batch they already
/// accepted.
pub trait Sink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Accepts one batch, in spool order.
    fn accept(&self, batch: &[LogEntry]) -> SinkResult<()>;
}
