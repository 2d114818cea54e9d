//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use practicehub_cache::MemoryCacheProvider;
use practicehub_core::config::AppConfig;
use practicehub_core::types::{JobId, UserId};
use practicehub_entity::job::{JobPayload, JobSnapshot};
use practicehub_sync::ProgressStore;
use practicehub_worker::JobEngine;

/// Test application context
pub struct TestApp {
    pub jobs: Arc<JobEngine>,
    pub progress: Arc<ProgressStore>,
    pub cache: Arc<MemoryCacheProvider>,
    pub config: AppConfig,
}

impl TestApp {
    /// Build every service from the default configuration
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Build every service from `config`
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            jobs: Arc::new(JobEngine::new(config.worker.clone())),
            progress: Arc::new(ProgressStore::new(config.progress.clone())),
            cache: Arc::new(MemoryCacheProvider::new(&config.cache)),
            config,
        }
    }

    /// Poll until the job reaches a terminal state
    pub async fn wait_for_job(&self, job_id: &JobId, owner: &UserId) -> JobSnapshot {
        for _ in 0..200 {
            let snapshot = self
                .jobs
                .get_job(job_id, owner)
                .expect("owner can poll its job")
                .expect("job exists");
            if snapshot.status.is_terminal() {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {job_id} did not finish in time");
    }
}

/// Build a payload from a JSON object literal
pub fn payload(value: Value) -> JobPayload {
    value.as_object().cloned().expect("payload must be a JSON object")
}
