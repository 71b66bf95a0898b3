//! Log entry and submission types
//!
//! A [`LogSubmission`] is what arrives over the wire; every field is
//! optional so that validation, not deserialization, names what is missing.
//! A [`LogEntry`] is the validated, immutable record that the spool stores
//! as one JSON line.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{EntryError, EntryResult};

/// Maximum byte length of `service`
pub const MAX_SERVICE_LEN: usize = 128;
/// Maximum byte length of `level`
pub const MAX_LEVEL_LEN: usize = 32;
/// Maximum byte length of `message`
pub const MAX_MESSAGE_LEN: usize = 64 * 1024;

/// One structured log record.
///
/// Fields are private: an entry never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    service: String,
    level: String,
    message: String,
    timestamp: String,
}

impl LogEntry {
    /// Builds an entry from already-validated parts.
    ///
    /// Use [`LogSubmission::into_entry`] for untrusted input.
    pub fn new(
        service: impl Into<String>,
        level: impl Into<String>,
        message: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            service: service.into(),
            level: level.into(),
            message: message.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn level(&self) -> &str {
        &self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// RFC3339 timestamp, either submitted or assigned at ingestion
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Serializes the entry as a single newline-terminated JSON line.
    pub fn to_line(&self) -> serde_json::Result<Vec<u8>> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    /// Parses one spool line (trailing newline optional).
    pub fn from_line(line: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(line.strip_suffix(b"\n").unwrap_or(line))
    }
}

/// Wire form of a `POST /logs` body.
///
/// Unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LogSubmission {
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl LogSubmission {
    /// Decodes a submission from a raw request body.
    ///
    /// # Errors
    ///
    /// `InvalidJson` if the body is not a JSON object with string fields.
    pub fn from_json(body: &[u8]) -> EntryResult<Self> {
        serde_json::from_slice(body).map_err(|e| EntryError::InvalidJson(e.to_string()))
    }

    /// Validates the submission and stamps it with the current UTC time
    /// when no timestamp was given.
    pub fn into_entry(self) -> EntryResult<LogEntry> {
        self.into_entry_at(Utc::now())
    }

    /// Same as [`into_entry`](Self::into_entry) with an explicit clock.
    pub fn into_entry_at(self, now: DateTime<Utc>) -> EntryResult<LogEntry> {
        let service = required("service", self.service, MAX_SERVICE_LEN)?;
        let level = required("level", self.level, MAX_LEVEL_LEN)?;
        let message = required("message", self.message, MAX_MESSAGE_LEN)?;

        // An empty timestamp counts as absent.
        let timestamp = match self.timestamp.filter(|t| !t.is_empty()) {
            Some(ts) => {
                DateTime::parse_from_rfc3339(&ts)
                    .map_err(|_| EntryError::InvalidTimestamp(ts.clone()))?;
                ts
            }
            None => now.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        Ok(LogEntry {
            service,
            level,
            message,
            timestamp,
        })
    }
}

fn required(field: &'static str, value: Option<String>, max: usize) -> EntryResult<String> {
    let value = value.ok_or(EntryError::MissingField(field))?;
    if value.trim().is_empty() {
        return Err(EntryError::BlankField(field));
    }
    if value.len() > max {
        return Err(EntryError::FieldTooLong { field, max });
    }
    Ok(value)
}
