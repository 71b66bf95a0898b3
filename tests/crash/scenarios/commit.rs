//! Crashes between sink delivery and deleting the processing file
//!
//! Delivery is at-least-once: the batch is redelivered on restart.

use tempfile::TempDir;

use crate::crash::{clean_drain, crash_drain_at, enqueue_messages, layout, sink_messages};
use logspool::crash_point::points;

#[test]
fn test_crash_before_commit_redelivers_batch() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let sink_file = temp_dir.path().join("processed.jsonl");

    enqueue_messages(&data_dir, &["x", "y"]);
    crash_drain_at(points::SPOOL_BEFORE_COMMIT, &data_dir, &sink_file);

    // Delivered, but the processing file is still there
    assert_eq!(sink_messages(&sink_file), vec!["x", "y"]);
    assert!(layout(&data_dir).processing_path().exists());

    clean_drain(&data_dir, &sink_file);

    assert_eq!(sink_messages(&sink_file), vec!["x", "y", "x", "y"]);
    assert!(!layout(&data_dir).processing_path().exists());
}

#[test]
fn test_clean_run_after_commit_has_nothing_to_redeliver() {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    let sink_file = temp_dir.path().join("processed.jsonl");

    enqueue_messages(&data_dir, &["only"]);
    clean_drain(&data_dir, &sink_file);
    clean_drain(&data_dir, &sink_file);

    assert_eq!(sink_messages(&sink_file), vec!["only"]);
}
