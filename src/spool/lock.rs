//! Advisory file locks guarding the spool.
//!
//! `spool.lock` serialises appends and swaps across processes; the spool
//! pairs it with an in-process mutex because advisory locks are held per
//! open file, not per thread. `drain.lock` is held for the whole lifetime
//! of the single drainer.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use super::errors::{SpoolError, SpoolResult};
use super::layout::SpoolLayout;

fn open_lock_file(path: &Path) -> SpoolResult<File> {
    OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| SpoolError::io("open lock file", path, e))
}

/// Cross-process exclusive lock for the append/swap critical section.
#[derive(Debug)]
pub(crate) struct SpoolLock {
    file: File,
    path: PathBuf,
}

impl SpoolLock {
    pub(crate) fn open(layout: &SpoolLayout) -> SpoolResult<Self> {
        let path = layout.spool_lock_path();
        let file = open_lock_file(&path)?;
        Ok(Self { file, path })
    }

    /// Blocks until the lock is held. Released when the guard drops.
    pub(crate) fn acquire(&self) -> SpoolResult<SpoolLockGuard<'_>> {
        FileExt::lock_exclusive(&self.file).map_err(|e| {
            SpoolError::Lock(format!("cannot lock {}: {}", self.path.display(), e))
        })?;
        Ok(SpoolLockGuard { file: &self.file })
    }
}

pub(crate) struct SpoolLockGuard<'a> {
    file: &'a File,
}

impl Drop for SpoolLockGuard<'_> {
    fn drop(&mut self) {
        // Closing the descriptor would release it as well; unlock eagerly so
        // the next producer is not held up.
        let _ = FileExt::unlock(self.file);
    }
}

/// Proof that this process is the only drainer of a spool.
///
/// Acquired without blocking: a second drainer fails immediately with
/// [`SpoolError::DrainerBusy`]. The lease is released on drop or process
/// exit.
#[derive(Debug)]
pub struct DrainLease {
    _file: File,
    path: PathBuf,
}

impl DrainLease {
    pub fn acquire(layout: &SpoolLayout) -> SpoolResult<Self> {
        layout.ensure_dir()?;
        let path = layout.drain_lock_path();
        let file = open_lock_file(&path)?;

        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => {
                debug!(lease = %path.display(), "drain lease acquired");
                Ok(Self { _file: file, path })
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Err(SpoolError::DrainerBusy(path)),
            Err(e) if e.raw_os_error() == fs2::lock_contended_error().raw_os_error() => {
                Err(SpoolError::DrainerBusy(path))
            }
            Err(e) => Err(SpoolError::Lock(format!(
                "cannot lock {}: {}",
                path.display(),
                e
            ))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_second_lease_is_refused() {
        let temp_dir = TempDir::new().unwrap();
        let layout = SpoolLayout::new(temp_dir.path());

        let first = DrainLease::acquire(&layout).unwrap();
        let second = DrainLease::acquire(&layout);
        assert!(matches!(second, Err(SpoolError::DrainerBusy(_))));

        drop(first);
        assert!(DrainLease::acquire(&layout).is_ok());
    }

    #[test]
    fn test_spool_lock_reacquires_after_guard_drop() {
        let temp_dir = TempDir::new().unwrap();
        let layout = SpoolLayout::new(temp_dir.path());
        let lock = SpoolLock::open(&layout).unwrap();

        {
            let _guard = lock.acquire().unwrap();
        }
        let _guard = lock.acquire().unwrap();
        assert!(layout.spool_lock_path().exists());
    }
}
