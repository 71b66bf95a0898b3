//! Crash test harness for subprocess management
//!
//! Runs `logspool drain` as a child process, optionally with a crash point
//! armed, and captures how it ended.

use std::path::Path;
use std::process::{Command, ExitStatus};

use logspool::crash_point::CRASH_POINT_ENV;

/// Result of one `logspool drain` execution
#[derive(Debug)]
pub struct CrashTestResult {
    /// Whether the process ended abnormally
    pub crashed: bool,
    /// Exit status
    pub exit_status: ExitStatus,
    /// stdout output
    pub stdout: String,
    /// stderr output
    pub stderr: String,
}

/// Run `logspool drain` against `data_dir`, delivering to `sink_file`.
///
/// With `crash_point` set the child aborts when it reaches that point.
pub fn run_drain(crash_point: Option<&str>, data_dir: &Path, sink_file: &Path) -> CrashTestResult {
    let mut command = Command::new(env!("CARGO_BIN_EXE_logspool"));
    command
        .arg("drain")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--sink-file")
        .arg(sink_file)
        .env_remove(CRASH_POINT_ENV)
        .env("RUST_LOG", "warn");

    if let Some(point) = crash_point {
        command.env(CRASH_POINT_ENV, point);
    }

    let output = command.output().expect("failed to run logspool binary");
    CrashTestResult {
        crashed: !output.status.success(),
        exit_status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    }
}

/// Run `logspool drain` and require a crash at `crash_point`.
pub fn crash_drain_at(crash_point: &str, data_dir: &Path, sink_file: &Path) -> CrashTestResult {
    let result = run_drain(Some(crash_point), data_dir, sink_file);
    if !result.crashed || !result.stderr.contains(crash_point) {
        report_failure(crash_point, "drain", "abort at crash point", &result);
        panic!("process did not crash at {}", crash_point);
    }
    result
}

/// Run `logspool drain` and require success.
pub fn clean_drain(data_dir: &Path, sink_file: &Path) -> CrashTestResult {
    let result = run_drain(None, data_dir, sink_file);
    if result.crashed {
        report_failure("none", "drain", "exit 0", &result);
        panic!("drain failed: {:?}", result.exit_status);
    }
    result
}

/// Report crash test failure
pub fn report_failure(crash_point: &str, operation: &str, expected: &str, actual: &CrashTestResult) {
    eprintln!("=== CRASH TEST FAILURE ===");
    eprintln!("Crash point: {}", crash_point);
    eprintln!("Operation: {}", operation);
    eprintln!("Expected: {}", expected);
    eprintln!("Actual: {:?}", actual.exit_status);
    eprintln!("stdout:\n{}", actual.stdout);
    eprintln!("stderr:\n{}", actual.stderr);
    eprintln!("==========================");
}
