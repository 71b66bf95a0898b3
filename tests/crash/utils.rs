//! Crash testing utilities

use std::fs;
use std::path::Path;

use logspool::entry::LogEntry;
use logspool::spool::{Spool, SpoolConfig, SpoolLayout};

/// Append entries to the spool in `data_dir`, one per message.
pub fn enqueue_messages(data_dir: &Path, messages: &[&str]) {
    let spool = Spool::open(SpoolConfig::new(data_dir)).unwrap();
    for message in messages {
        spool
            .enqueue(&LogEntry::new("crash", "info", *message, "2026-10-19T08:30:00Z"))
            .unwrap();
    }
}

/// Messages in the sink file, in delivery order.
pub fn sink_messages(sink_file: &Path) -> Vec<String> {
    let content = match fs::read_to_string(sink_file) {
        Ok(content) => content,
        Err(_) => return Vec::new(),
    };
    content
        .lines()
        .map(|line| LogEntry::from_line(line.as_bytes()).unwrap().message().to_string())
        .collect()
}

/// Number of complete lines in a spool file (0 if missing).
pub fn line_count(path: &Path) -> usize {
    fs::read_to_string(path)
        .map(|content| content.lines().count())
        .unwrap_or(0)
}

pub fn layout(data_dir: &Path) -> SpoolLayout {
    SpoolLayout::new(data_dir)
}
