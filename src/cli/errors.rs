//! CLI-specific error types
//!
//! Every CLI error ends the process with a non-zero exit.

use std::fmt;

use crate::spool::SpoolError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file or flag error
    ConfigError,
    /// Runtime, listener or subscriber could not start
    BootFailed,
    /// The spool reported a storage failure
    StorageError,
    /// Another drainer holds the drain lease
    DrainerBusy,
    /// The sink refused a batch; it stays on disk
    SinkFailed,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "LOGSPOOL_CLI_CONFIG_ERROR",
            Self::BootFailed => "LOGSPOOL_CLI_BOOT_FAILED",
            Self::StorageError => "LOGSPOOL_CLI_STORAGE_ERROR",
            Self::DrainerBusy => "LOGSPOOL_CLI_DRAINER_BUSY",
            Self::SinkFailed => "LOGSPOOL_CLI_SINK_FAILED",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// Boot failed
    pub fn boot_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::BootFailed, msg)
    }

    /// Sink failed
    pub fn sink_failed(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::SinkFailed, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<SpoolError> for CliError {
    fn from(e: SpoolError) -> Self {
        let code = match e {
            SpoolError::DrainerBusy(_) => CliErrorCode::DrainerBusy,
            _ => CliErrorCode::StorageError,
        };
        Self::new(code, e.to_string())
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
