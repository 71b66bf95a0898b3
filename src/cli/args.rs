//! CLI argument definitions using clap
//!
//! Commands:
//! - logspool ingest [--port <port>]
//! - logspool worker [--port <port>]
//! - logspool serve [--port <port>]
//! - logspool drain

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// logspool - durable log spool with an HTTP ingestion API
#[derive(Parser, Debug)]
#[command(name = "logspool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every command
#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Path to JSON configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Spool directory (overrides the config file)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Deliver drained entries to this JSON-lines file instead of stdout
    #[arg(long)]
    pub sink_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the ingestion API (POST /logs)
    Ingest {
        #[command(flatten)]
        common: CommonArgs,

        /// Port to listen on (overrides ingest.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run the drain loop and serve /health and /metrics
    Worker {
        #[command(flatten)]
        common: CommonArgs,

        /// Port to listen on (overrides worker.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Ingestion API and drain loop in one process
    Serve {
        #[command(flatten)]
        common: CommonArgs,

        /// Port to listen on (overrides ingest.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single drain, recovery included, and exit
    Drain {
        #[command(flatten)]
        common: CommonArgs,
    },
}

impl Command {
    pub fn common(&self) -> &CommonArgs {
        match self {
            Command::Ingest { common, .. }
            | Command::Worker { common, .. }
            | Command::Serve { common, .. }
            | Command::Drain { common } => common,
        }
    }
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
