//! Spool counters
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start
//! - Thread-safe, lock-free

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters shared by producers and the drainer.
///
/// Uses Relaxed ordering; counters are informational and never drive
/// control flow.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    entries_enqueued: AtomicU64,
    bytes_enqueued: AtomicU64,
    enqueue_failures: AtomicU64,
    torn_tails_repaired: AtomicU64,
    swaps: AtomicU64,
    batches_delivered: AtomicU64,
    entries_delivered: AtomicU64,
    corrupt_lines: AtomicU64,
    sink_failures: AtomicU64,
    recoveries: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Producer side

    /// Record one durable append of `bytes` bytes
    pub fn record_enqueue(&self, bytes: u64) {
        self.entries_enqueued.fetch_add(1, Ordering::Relaxed);
        self.bytes_enqueued.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_enqueue_failures(&self) {
        self.enqueue_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_torn_tails(&self) {
        self.torn_tails_repaired.fetch_add(1, Ordering::Relaxed);
    }

    // Drain side

    pub fn increment_swaps(&self) {
        self.swaps.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch the sink accepted
    pub fn record_delivery(&self, entries: u64) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
        self.entries_delivered.fetch_add(entries, Ordering::Relaxed);
    }

    pub fn add_corrupt_lines(&self, lines: u64) {
        self.corrupt_lines.fetch_add(lines, Ordering::Relaxed);
    }

    pub fn increment_sink_failures(&self) {
        self.sink_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// A leftover processing file was found and delivered
    pub fn increment_recoveries(&self) {
        self.recoveries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn entries_enqueued(&self) -> u64 {
        self.entries_enqueued.load(Ordering::Relaxed)
    }

    pub fn entries_delivered(&self) -> u64 {
        self.entries_delivered.load(Ordering::Relaxed)
    }

    pub fn corrupt_lines(&self) -> u64 {
        self.corrupt_lines.load(Ordering::Relaxed)
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            entries_enqueued: self.entries_enqueued.load(Ordering::Relaxed),
            bytes_enqueued: self.bytes_enqueued.load(Ordering::Relaxed),
            enqueue_failures: self.enqueue_failures.load(Ordering::Relaxed),
            torn_tails_repaired: self.torn_tails_repaired.load(Ordering::Relaxed),
            swaps: self.swaps.load(Ordering::Relaxed),
            batches_delivered: self.batches_delivered.load(Ordering::Relaxed),
            entries_delivered: self.entries_delivered.load(Ordering::Relaxed),
            corrupt_lines: self.corrupt_lines.load(Ordering::Relaxed),
            sink_failures: self.sink_failures.load(Ordering::Relaxed),
            recoveries: self.recoveries.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`MetricsRegistry`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub entries_enqueued: u64,
    pub bytes_enqueued: u64,
    pub enqueue_failures: u64,
    pub torn_tails_repaired: u64,
    pub swaps: u64,
    pub batches_delivered: u64,
    pub entries_delivered: u64,
    pub corrupt_lines: u64,
    pub sink_failures: u64,
    pub recoveries: u64,
}
