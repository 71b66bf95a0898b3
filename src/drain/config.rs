//! Drain loop configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between drain cycles
pub const DEFAULT_DRAIN_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrainConfig {
    /// Milliseconds between the start of two cycles (default: 2000)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Run one last cycle after the stop signal (default: true)
    #[serde(default = "default_drain_on_shutdown")]
    pub drain_on_shutdown: bool,
}

fn default_interval_ms() -> u64 {
    DEFAULT_DRAIN_INTERVAL_MS
}

fn default_drain_on_shutdown() -> bool {
    true
}

impl Default for DrainConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            drain_on_shutdown: default_drain_on_shutdown(),
        }
    }
}

impl DrainConfig {
    pub fn with_interval(interval: Duration) -> Self {
        Self {
            interval_ms: interval.as_millis().max(1) as u64,
            ..Default::default()
        }
    }

    /// Period between cycles, never shorter than 1 ms
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}
