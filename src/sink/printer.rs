//! Sink that prints every entry through the process logger.

use tracing::info;

use super::{Sink, SinkResult};
use crate::entry::LogEntry;

/// Prints `[PROCESS] <timestamp> | <service> | <message>` per entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrinterSink;

impl PrinterSink {
    pub fn new() -> Self {
        Self
    }

    /// Formats a single entry the way it is printed
    pub fn format_entry(entry: &LogEntry) -> String {
        format!(
            "[PROCESS] {} | {} | {}",
            entry.timestamp(),
            entry.service(),
            entry.message()
        )
    }
}

impl Sink for PrinterSink {
    fn name(&self) -> &str {
        "printer"
    }

    fn accept(&self, batch: &[LogEntry]) -> SinkResult<()> {
        for entry in batch {
            info!(target: "logspool::process", entry_level = entry.level(), "{}", Self::format_entry(entry));
        }
        Ok(())
    }
}
