//! Crash point injection for testing durability
//!
//! A crash point is enabled through the `LOGSPOOL_CRASH_POINT` environment
//! variable. When the running code reaches the named point the process
//! terminates immediately via `std::process::abort()`: no cleanup, no
//! unwinding, no buffered output flushed.
//!
//! ```bash
//! LOGSPOOL_CRASH_POINT=spool_after_swap logspool drain --data-dir ./data
//! ```

use std::sync::OnceLock;

/// Environment variable naming the active crash point
pub const CRASH_POINT_ENV: &str = "LOGSPOOL_CRASH_POINT";

static CRASH_POINT: OnceLock<Option<String>> = OnceLock::new();

#[inline]
fn get_crash_point() -> Option<&'static str> {
    CRASH_POINT
        .get_or_init(|| std::env::var(CRASH_POINT_ENV).ok())
        .as_deref()
}

/// Returns true if `LOGSPOOL_CRASH_POINT` equals `name`.
#[inline]
pub fn crash_point_enabled(name: &str) -> bool {
    get_crash_point().map(|p| p == name).unwrap_or(false)
}

/// Aborts the process if the named crash point is enabled.
///
/// No-op when the variable is unset or names another point.
#[inline]
pub fn maybe_crash(name: &str) {
    if crash_point_enabled(name) {
        eprintln!("[CRASH] Triggering crash at point: {}", name);
        std::process::abort();
    }
}

/// All defined crash point names
pub mod points {
    /// Line encoded, lock not yet taken
    pub const SPOOL_BEFORE_APPEND: &str = "spool_before_append";
    /// Line written and synced, not yet acknowledged
    pub const SPOOL_AFTER_APPEND: &str = "spool_after_append";
    /// Active file renamed to processing, fresh active not yet created
    pub const SPOOL_MID_SWAP: &str = "spool_mid_swap";
    /// Swap complete, batch not yet delivered
    pub const SPOOL_AFTER_SWAP: &str = "spool_after_swap";
    /// Sink accepted the batch, processing file not yet deleted
    pub const SPOOL_BEFORE_COMMIT: &str = "spool_before_commit";

    pub fn all() -> &'static [&'static str] {
        &[
            SPOOL_BEFORE_APPEND,
            SPOOL_AFTER_APPEND,
            SPOOL_MID_SWAP,
            SPOOL_AFTER_SWAP,
            SPOOL_BEFORE_COMMIT,
        ]
    }
}
