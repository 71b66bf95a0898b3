//! Sink that appends delivered entries to a downstream JSON-lines file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Sink, SinkError, SinkResult};
use crate::entry::LogEntry;

/// Appends each batch to `path` and fsyncs before reporting success.
///
/// The file is reopened for every batch so it can be rotated externally.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileSink {
    /// Creates a sink writing to `path`. Parent directories are created on
    /// first delivery.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, action: &'static str, source: std::io::Error) -> SinkError {
        SinkError::Io {
            action,
            path: self.path.clone(),
            source,
        }
    }
}

impl Sink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    fn accept(&self, batch: &[LogEntry]) -> SinkResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut buffer = Vec::with_capacity(batch.len() * 128);
        for entry in batch {
            let line = entry
                .to_line()
                .map_err(|e| SinkError::Rejected(format!("cannot encode entry: {}", e)))?;
            buffer.extend_from_slice(&line);
        }

        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| SinkError::Unavailable("file sink lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error("create directory for", e))?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error("open", e))?;

        file.write_all(&buffer)
            .map_err(|e| self.io_error("append to", e))?;
        file.sync_all().map_err(|e| self.io_error("fsync", e))?;

        Ok(())
    }
}
