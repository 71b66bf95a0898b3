//! logspool - a durable log spool
//!
//! Log entries submitted over HTTP are appended to an on-disk queue and
//! acknowledged only once durable. A background drainer detaches the
//! queue with an atomic rename and forwards each batch to a sink,
//! deleting it only after the sink accepts it.

pub mod cli;
pub mod crash_point;
pub mod drain;
pub mod entry;
pub mod http_server;
pub mod observability;
pub mod sink;
pub mod spool;
