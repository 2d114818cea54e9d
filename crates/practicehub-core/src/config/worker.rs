//! Job engine configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Asynchronous job engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Number of processors allowed to run at the same time.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Maximum number of non-terminal jobs accepted at once (0 = unbounded).
    #[serde(default = "default_max_queued_jobs")]
    pub max_queued_jobs: usize,
    /// Age in seconds after which a job record is eligible for the sweep.
    #[serde(default = "default_job_ttl")]
    pub job_ttl_seconds: u64,
    /// Interval in seconds between job sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Also sweep jobs that are still pending or processing.
    #[serde(default)]
    pub sweep_in_flight: bool,
    /// Number of jobs returned by a listing when the caller gives no limit.
    #[serde(default = "default_list_limit")]
    pub default_list_limit: usize,
    /// Capacity of the job event broadcast channel.
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

impl WorkerConfig {
    /// Job record horizon as a [`Duration`].
    pub fn job_ttl(&self) -> Duration {
        Duration::from_secs(self.job_ttl_seconds)
    }

    /// Sweep period as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_seconds)
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            max_queued_jobs: default_max_queued_jobs(),
            job_ttl_seconds: default_job_ttl(),
            sweep_interval_seconds: default_sweep_interval(),
            sweep_in_flight: false,
            default_list_limit: default_list_limit(),
            event_buffer: default_event_buffer(),
        }
    }
}

fn default_concurrency() -> usize {
    4
}

fn default_max_queued_jobs() -> usize {
    1000
}

fn default_job_ttl() -> u64 {
    60 * 60
}

fn default_sweep_interval() -> u64 {
    5 * 60
}

fn default_list_limit() -> usize {
    10
}

fn default_event_buffer() -> usize {
    256
}
