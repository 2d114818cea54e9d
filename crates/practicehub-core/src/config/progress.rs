//! Progress synchronization store configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Settings for the per-user progress store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Seconds since the last sync after which a user's record is evicted.
    #[serde(default = "default_ttl")]
    pub ttl_seconds: u64,
    /// Interval in seconds between progress sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Maximum number of stored users (0 = unbounded).
    #[serde(default = "default_max_users")]
    pub max_users: usize,
}

impl ProgressConfig {
    /// Inactivity horizon as a [`Duration`].
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }

    /// Sweep period as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: default_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            max_users: default_max_users(),
        }
    }
}

fn default_ttl() -> u64 {
    7 * 24 * 60 * 60
}

fn default_sweep_interval() -> u64 {
    60 * 60
}

fn default_max_users() -> usize {
    100_000
}
