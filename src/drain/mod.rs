//! Drain loop
//!
//! A single scheduled task that calls [`Spool::drain`](crate::spool::Spool::drain)
//! at a fixed interval and forwards batches to a sink. It stops on a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) after the
//! in-flight cycle completes.

mod config;
mod task;

pub use config::{DrainConfig, DEFAULT_DRAIN_INTERVAL_MS};
pub use task::{CycleResult, DrainLoop, DrainSummary};
