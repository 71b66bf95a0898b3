//! CLI module for logspool
//!
//! Provides command-line interface for:
//! - ingest: Serve the ingestion API
//! - worker: Drain loop plus health endpoint
//! - serve: Both roles in one process
//! - drain: One-shot drain

mod args;
mod commands;
mod config;
mod errors;

pub use args::{Cli, CommonArgs, Command};
pub use commands::{drain_once, ingest, run, run_command, serve, worker};
pub use config::{Config, SinkConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
