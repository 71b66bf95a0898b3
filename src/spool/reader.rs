//! Processing file reader.
//!
//! Reads a detached snapshot line by line. Unlike the append path, decoding
//! is lenient: a line that fails to parse is counted and skipped, never
//! fatal and never retried. Blank lines are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use super::errors::{SpoolError, SpoolResult};
use crate::entry::LogEntry;

/// Result of decoding one processing file
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DecodedBatch {
    /// Parsed entries, in file order
    pub entries: Vec<LogEntry>,
    /// Lines that did not parse as a LogEntry
    pub corrupt_lines: usize,
}

pub(crate) fn read_batch(path: &Path) -> SpoolResult<DecodedBatch> {
    let file = File::open(path).map_err(|e| SpoolError::io("open processing file", path, e))?;
    let mut reader = BufReader::new(file);

    let mut batch = DecodedBatch::default();
    let mut line = Vec::with_capacity(256);
    let mut line_number = 0usize;

    loop {
        line.clear();
        let read = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| SpoolError::io("read processing file", path, e))?;
        if read == 0 {
            break;
        }
        line_number += 1;

        if line.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        match LogEntry::from_line(&line) {
            Ok(entry) => batch.entries.push(entry),
            Err(e) => {
                batch.corrupt_lines += 1;
                warn!(
                    file = %path.display(),
                    line = line_number,
                    error = %e,
                    "skipping corrupt spool line"
                );
            }
        }
    }

    Ok(batch)
}
