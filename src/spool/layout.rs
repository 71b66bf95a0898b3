//! On-disk layout of a spool directory.
//!
//! ```text
//! <data_dir>/
//!   log_queue.jsonl             active file, append target
//!   log_queue.processing.jsonl  snapshot detached by the last swap
//!   spool.lock                  append/swap lock
//!   drain.lock                  single-drainer lease
//! ```

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use super::errors::{SpoolError, SpoolResult};

pub const ACTIVE_FILE: &str = "log_queue.jsonl";
pub const PROCESSING_FILE: &str = "log_queue.processing.jsonl";
pub const SPOOL_LOCK_FILE: &str = "spool.lock";
pub const DRAIN_LOCK_FILE: &str = "drain.lock";

/// Paths of every file a spool owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolLayout {
    data_dir: PathBuf,
}

impl SpoolLayout {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn active_path(&self) -> PathBuf {
        self.data_dir.join(ACTIVE_FILE)
    }

    pub fn processing_path(&self) -> PathBuf {
        self.data_dir.join(PROCESSING_FILE)
    }

    pub fn spool_lock_path(&self) -> PathBuf {
        self.data_dir.join(SPOOL_LOCK_FILE)
    }

    pub fn drain_lock_path(&self) -> PathBuf {
        self.data_dir.join(DRAIN_LOCK_FILE)
    }

    /// Creates the data directory if it does not exist.
    pub fn ensure_dir(&self) -> SpoolResult<()> {
        if !self.data_dir.exists() {
            fs::create_dir_all(&self.data_dir)
                .map_err(|e| SpoolError::io("create data directory", &self.data_dir, e))?;
        }
        Ok(())
    }

    /// fsync the data directory so renames, creates and deletes are durable.
    pub fn sync_dir(&self) -> SpoolResult<()> {
        let dir = File::open(&self.data_dir)
            .map_err(|e| SpoolError::io("open data directory", &self.data_dir, e))?;
        dir.sync_all()
            .map_err(|e| SpoolError::io("fsync data directory", &self.data_dir, e))
    }
}
