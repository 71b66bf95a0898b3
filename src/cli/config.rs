//! Configuration file and command-line overrides
//!
//! Every field is optional; a missing file section falls back to its
//! default. Example:
//!
//! ```json
//! {
//!   "data_dir": "/var/lib/logspool",
//!   "fsync": true,
//!   "log_level": "info",
//!   "ingest": { "port": 8080 },
//!   "worker": { "port": 8081 },
//!   "drain": { "interval_ms": 2000 },
//!   "sink": { "type": "file", "path": "/var/log/app/processed.jsonl" }
//! }
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::args::CommonArgs;
use super::errors::{CliError, CliResult};
use crate::drain::DrainConfig;
use crate::http_server::HttpServerConfig;
use crate::sink::{FileSink, PrinterSink, Sink};
use crate::spool::SpoolConfig;

/// Where drained batches go
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkConfig {
    /// Structured log line per entry
    #[default]
    Printer,
    /// Append JSON lines to a file
    File { path: PathBuf },
}

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Spool directory (default "./data")
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// fsync each append before acknowledging (default true)
    #[serde(default = "default_fsync")]
    pub fsync: bool,

    /// Default tracing level; `RUST_LOG` takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "HttpServerConfig::ingest_default")]
    pub ingest: HttpServerConfig,

    #[serde(default = "HttpServerConfig::worker_default")]
    pub worker: HttpServerConfig,

    #[serde(default)]
    pub drain: DrainConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}
fn default_fsync() -> bool {
    true
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            fsync: default_fsync(),
            log_level: default_log_level(),
            ingest: HttpServerConfig::ingest_default(),
            worker: HttpServerConfig::worker_default(),
            drain: DrainConfig::default(),
            sink: SinkConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            CliError::config_error(format!("Failed to read config {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))
    }

    /// Resolves the effective configuration: file (if any), then flags.
    pub fn resolve(args: &CommonArgs) -> CliResult<Self> {
        let mut config = match &args.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    /// Command-line flags win over the file
    pub fn apply_overrides(&mut self, args: &CommonArgs) {
        if let Some(data_dir) = &args.data_dir {
            self.data_dir = data_dir.clone();
        }
        if let Some(path) = &args.sink_file {
            self.sink = SinkConfig::File { path: path.clone() };
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> CliResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(CliError::config_error("data_dir must not be empty"));
        }

        tracing::Level::from_str(&self.log_level).map_err(|_| {
            CliError::config_error(format!(
                "Invalid log_level: '{}'. Expected trace, debug, info, warn or error.",
                self.log_level
            ))
        })?;

        if self.drain.interval_ms == 0 {
            return Err(CliError::config_error("drain.interval_ms must be > 0"));
        }

        // Only the ingest listener accepts request bodies
        if self.ingest.max_body_bytes == 0 {
            return Err(CliError::config_error("ingest.max_body_bytes must be > 0"));
        }

        if let SinkConfig::File { path } = &self.sink {
            if path.as_os_str().is_empty() {
                return Err(CliError::config_error("sink.path must not be empty"));
            }
        }

        Ok(())
    }

    pub fn spool_config(&self) -> SpoolConfig {
        SpoolConfig::new(&self.data_dir).with_fsync(self.fsync)
    }

    pub fn build_sink(&self) -> Arc<dyn Sink> {
        match &self.sink {
            SinkConfig::Printer => Arc::new(PrinterSink::new()),
            SinkConfig::File { path } => Arc::new(FileSink::new(path)),
        }
    }
}
