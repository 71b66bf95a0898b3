//! In-memory sink for tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use super::{Sink, SinkError, SinkResult};
use crate::entry::LogEntry;

/// Collects accepted batches in memory.
///
/// `fail_next(n)` makes the next `n` deliveries fail with
/// `SinkError::Unavailable` without recording anything.
#[derive(Debug, Default)]
pub struct MemorySink {
    batches: Mutex<Vec<Vec<LogEntry>>>,
    failures_left: AtomicUsize,
    attempts: AtomicUsize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `n` deliveries.
    pub fn fail_next(&self, n: usize) {
        self.failures_left.store(n, Ordering::SeqCst);
    }

    /// All accepted batches, in delivery order.
    pub fn batches(&self) -> Vec<Vec<LogEntry>> {
        self.batches
            .lock()
            .map(|b| b.clone())
            .unwrap_or_default()
    }

    /// All accepted entries, flattened.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.batches().into_iter().flatten().collect()
    }

    /// Number of accepted entries.
    pub fn len(&self) -> usize {
        self.batches
            .lock()
            .map(|b| b.iter().map(Vec::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Delivery attempts, failed ones included.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn accept(&self, batch: &[LogEntry]) -> SinkResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SinkError::Unavailable("injected failure".to_string()));
        }

        let mut batches = self
            .batches
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        batches.push(batch.to_vec());
        Ok(())
    }
}
