//! Crashes around the active -> processing swap
//!
//! A processing file left behind by a crash must be delivered on the next
//! run, ahead of anything appended after it.

use tempfile::TempDir;

use crate::crash::{clean_drain, crash_drain_at, enqueue_messages, layout, line_count, sink_messages};
use logspool::crash_point::points;

#[test]
fn test_crash_after_swap_recovers_in_order() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let sink_file = temp_dir.path().join("processed.jsonl");

    enqueue_messages(&data_dir, &["old-1", "old-2"]);
    crash_drain_at(points::SPOOL_AFTER_SWAP, &data_dir, &sink_file);

    // The batch survived the crash undelivered
    let layout = layout(&data_dir);
    assert_eq!(line_count(&layout.processing_path()), 2);
    assert_eq!(line_count(&layout.active_path()), 0);
    assert!(sink_messages(&sink_file).is_empty());

    enqueue_messages(&data_dir, &["new-1"]);
    clean_drain(&data_dir, &sink_file);

    assert_eq!(sink_messages(&sink_file), vec!["old-1", "old-2", "new-1"]);
    assert!(!layout.processing_path().exists());
    assert_eq!(line_count(&layout.active_path()), 0);
}

#[test]
fn test_crash_mid_swap_loses_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let sink_file = temp_dir.path().join("processed.jsonl");

    enqueue_messages(&data_dir, &["a", "b"]);
    crash_drain_at(points::SPOOL_MID_SWAP, &data_dir, &sink_file);

    // Renamed, but the fresh active file was never created
    let layout = layout(&data_dir);
    assert!(layout.processing_path().exists());
    assert!(!layout.active_path().exists());

    // Producers recreate the active file on their next append
    enqueue_messages(&data_dir, &["c"]);
    clean_drain(&data_dir, &sink_file);

    assert_eq!(sink_messages(&sink_file), vec!["a", "b", "c"]);
}

#[test]
fn test_repeated_crashes_never_overwrite_pending_batch() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let sink_file = temp_dir.path().join("processed.jsonl");

    enqueue_messages(&data_dir, &["first"]);
    crash_drain_at(points::SPOOL_AFTER_SWAP, &data_dir, &sink_file);

    // The next run delivers the leftover, then swaps and crashes again
    enqueue_messages(&data_dir, &["second"]);
    crash_drain_at(points::SPOOL_AFTER_SWAP, &data_dir, &sink_file);
    assert_eq!(sink_messages(&sink_file), vec!["first"]);

    clean_drain(&data_dir, &sink_file);
    assert_eq!(sink_messages(&sink_file), vec!["first", "second"]);
}
