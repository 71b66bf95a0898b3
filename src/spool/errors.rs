//! Spool error types
//!
//! Error codes:
//! - LOGSPOOL_SPOOL_IO: a spool file or directory operation failed
//! - LOGSPOOL_SPOOL_ENCODE: an entry could not be serialized
//! - LOGSPOOL_SPOOL_LOCK: the append/swap lock could not be taken
//! - LOGSPOOL_SPOOL_DRAINER_BUSY: another drainer owns this spool
//!
//! None of these is fatal. A failed enqueue is reported to the caller, who
//! retries; a failed drain leaves every file where it was.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for spool operations
pub type SpoolResult<T> = Result<T, SpoolError>;

#[derive(Debug, Error)]
pub enum SpoolError {
    /// Filesystem operation failed
    #[error("failed to {action} {}: {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to encode log entry: {0}")]
    Encode(#[from] serde_json::Error),

    /// The in-process mutex was poisoned or the file lock failed
    #[error("spool lock unavailable: {0}")]
    Lock(String),

    /// A second drainer tried to attach to the same spool
    #[error("spool is already drained by another process (lease {})", .0.display())]
    DrainerBusy(PathBuf),
}

impl SpoolError {
    pub(crate) fn io(action: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        SpoolError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Stable error code for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            SpoolError::Io { .. } => "LOGSPOOL_SPOOL_IO",
            SpoolError::Encode(_) => "LOGSPOOL_SPOOL_ENCODE",
            SpoolError::Lock(_) => "LOGSPOOL_SPOOL_LOCK",
            SpoolError::DrainerBusy(_) => "LOGSPOOL_SPOOL_DRAINER_BUSY",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display_contains_context() {
        let err = SpoolError::io(
            "rename",
            "/data/log_queue.jsonl",
            io::Error::new(io::ErrorKind::Other, "disk error"),
        );
        let display = err.to_string();
        assert!(display.contains("rename"));
        assert!(display.contains("/data/log_queue.jsonl"));
        assert!(display.contains("disk error"));
        assert_eq!(err.code(), "LOGSPOOL_SPOOL_IO");
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error;
        let err = SpoolError::io(
            "open",
            "x",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_drainer_busy_code() {
        let err = SpoolError::DrainerBusy(PathBuf::from("/data/drain.lock"));
        assert_eq!(err.code(), "LOGSPOOL_SPOOL_DRAINER_BUSY");
        assert!(err.to_string().contains("drain.lock"));
    }
}
