//! Entry validation errors
//!
//! Every variant is a client error: the submission is rejected before it
//! reaches the spool.

use thiserror::Error;

/// Result type for entry validation
pub type EntryResult<T> = Result<T, EntryError>;

/// Reasons a submission cannot become a [`LogEntry`](super::LogEntry).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Body is not a JSON object of the expected shape
    #[error("invalid json: {0}")]
    InvalidJson(String),

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("field must not be blank: {0}")]
    BlankField(&'static str),

    #[error("field {field} exceeds {max} bytes")]
    FieldTooLong { field: &'static str, max: usize },

    /// Timestamp present but not RFC3339
    #[error("invalid timestamp {0:?}: expected RFC3339")]
    InvalidTimestamp(String),
}

impl EntryError {
    /// Stable error code for responses and logs
    pub fn code(&self) -> &'static str {
        match self {
            EntryError::InvalidJson(_) => "LOGSPOOL_ENTRY_INVALID_JSON",
            EntryError::MissingField(_) => "LOGSPOOL_ENTRY_MISSING_FIELD",
            EntryError::BlankField(_) => "LOGSPOOL_ENTRY_BLANK_FIELD",
            EntryError::FieldTooLong { .. } => "LOGSPOOL_ENTRY_FIELD_TOO_LONG",
            EntryError::InvalidTimestamp(_) => "LOGSPOOL_ENTRY_INVALID_TIMESTAMP",
        }
    }
}
