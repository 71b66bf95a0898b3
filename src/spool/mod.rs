//! Durable spool queue
//!
//! The spool is the only component that touches the queue files. Producers
//! call [`Spool::enqueue`]; the single drainer calls [`Spool::drain`] (or
//! [`Spool::take_batch`] for manual control).
//!
//! # Guarantees
//!
//! - Every acknowledged enqueue is on disk as one complete line
//! - A drain observes exactly the enqueues that completed before its swap
//! - A batch is deleted only after the sink accepted it
//! - A leftover processing file is delivered before the next swap
//!
//! Delivery is at-least-once: a sink failure, or a crash between delivery
//! and deletion, causes the same batch to be delivered again.

mod errors;
mod layout;
mod lock;
mod queue;
mod reader;

pub use errors::{SpoolError, SpoolResult};
pub use layout::{SpoolLayout, ACTIVE_FILE, DRAIN_LOCK_FILE, PROCESSING_FILE, SPOOL_LOCK_FILE};
pub use lock::DrainLease;
pub use queue::{DrainOutcome, DrainReport, PendingBatch, Spool, SpoolConfig};
pub use reader::DecodedBatch;
