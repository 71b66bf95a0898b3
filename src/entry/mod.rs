//! Log entry model
//!
//! Schema and validation for one log record. Validation happens here, before
//! anything touches the spool.

mod errors;
mod record;

pub use errors::{EntryError, EntryResult};
pub use record::{LogEntry, LogSubmission, MAX_LEVEL_LEN, MAX_MESSAGE_LEN, MAX_SERVICE_LEN};
