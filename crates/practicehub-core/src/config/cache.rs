//! TTL cache configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// In-memory cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL in seconds applied when a value is stored without one.
    #[serde(default = "default_ttl")]
    pub default_ttl_seconds: u64,
    /// Maximum number of entries in the cache.
    #[serde(default = "default_max_capacity")]
    pub max_capacity: u64,
    /// Interval in seconds between active expiry scans.
    #[serde(default = "default_check_period")]
    pub check_period_seconds: u64,
}

impl CacheConfig {
    /// Default entry TTL as a [`Duration`].
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Active expiry scan period as a [`Duration`].
    pub fn check_period(&self) -> Duration {
        Duration::from_secs(self.check_period_seconds)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl_seconds: default_ttl(),
            max_capacity: default_max_capacity(),
            check_period_seconds: default_check_period(),
        }
    }
}

fn default_ttl() -> u64 {
    600
}

fn default_max_capacity() -> u64 {
    10000
}

// A fifth of the default TTL.
fn default_check_period() -> u64 {
    default_ttl() / 5
}
