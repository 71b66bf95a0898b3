//! Crash testing framework for logspool
//!
//! Provides:
//! - Subprocess management with crash injection
//! - Spool seeding and sink inspection helpers

pub mod harness;
pub mod scenarios;
pub mod utils;

pub use harness::*;
pub use utils::*;
