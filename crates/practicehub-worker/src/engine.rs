//! Job engine: the service object handed to routing and adapter layers.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing;

use practicehub_core::config::worker::WorkerConfig;
use practicehub_core::error::AppError;
use practicehub_core::result::AppResult;
use practicehub_core::traits::sweeper::Sweeper;
use practicehub_core::types::{JobId, UserId};
use practicehub_entity::job::{JobPayload, JobSnapshot, JobStats, JobStatus, JobType};

use crate::executor::{JobProcessor, ProcessorRegistry};
use crate::queue::JobQueue;
use crate::runner::{JobEvent, JobRunner};

/// In-process asynchronous job engine.
///
/// Cloning is cheap; clones share the same jobs and processors.
#[derive(Debug, Clone)]
pub struct JobEngine {
    queue: Arc<JobQueue>,
    registry: Arc<ProcessorRegistry>,
    runner: JobRunner,
    config: WorkerConfig,
}

impl JobEngine {
    /// Create an engine with no processors registered.
    pub fn new(config: WorkerConfig) -> Self {
        let queue = Arc::new(JobQueue::new(config.max_queued_jobs));
        let registry = Arc::new(ProcessorRegistry::new());
        let runner = JobRunner::new(
            Arc::clone(&queue),
            Arc::clone(&registry),
            config.concurrency,
            config.event_buffer,
        );

        tracing::info!(
            "Job engine created: concurrency={}, max_queued_jobs={}, job_ttl={}s",
            config.concurrency,
            config.max_queued_jobs,
            config.job_ttl_seconds
        );

        Self {
            queue,
            registry,
            runner,
            config,
        }
    }

    /// Register the processor for a job type. A later registration for the
    /// same type replaces the earlier one.
    pub fn register_processor(
        &self,
        job_type: impl Into<JobType>,
        processor: Arc<dyn JobProcessor>,
    ) {
        self.registry.register(job_type.into(), processor);
    }

    /// Create a pending job and schedule its dispatch.
    ///
    /// Must be called from within a Tokio runtime. Processor failures never
    /// surface here; they are only visible by polling. The `Pending` event is
    /// published before dispatch, but on a multi-threaded runtime the job may
    /// already be processing or finished by the time this returns.
    pub fn submit(
        &self,
        owner_id: UserId,
        job_type: impl Into<JobType>,
        payload: JobPayload,
    ) -> AppResult<JobId> {
        if tokio::runtime::Handle::try_current().is_err() {
            return Err(AppError::internal(
                "Job submission requires a running Tokio runtime",
            ));
        }

        let job = self.queue.enqueue(owner_id, job_type.into(), payload)?;
        let job_id = job.id;

        tracing::info!(
            "Submitted job: id={}, type='{}', owner='{}'",
            job_id,
            job.job_type,
            job.owner_id
        );

        self.runner.publish(&job, JobStatus::Pending);
        self.runner.dispatch(job);
        Ok(job_id)
    }

    /// Poll a job on behalf of `caller_id`.
    ///
    /// `Ok(None)` for an unknown id; an authorization error if the job
    /// belongs to another user.
    pub fn get_job(&self, job_id: &JobId, caller_id: &UserId) -> AppResult<Option<JobSnapshot>> {
        self.queue.get_for(job_id, caller_id)
    }

    /// Up to `limit` of the caller's jobs, newest first.
    pub fn get_user_jobs(&self, caller_id: &UserId, limit: Option<usize>) -> Vec<JobSnapshot> {
        let limit = limit.unwrap_or(self.config.default_list_limit);
        self.queue.list_for(caller_id, limit)
    }

    /// Counts of stored jobs by status.
    pub fn get_stats(&self) -> JobStats {
        self.queue.stats()
    }

    /// Receive every subsequent status transition.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.runner.subscribe()
    }

    /// Job types with a registered processor, sorted by name.
    pub fn registered_types(&self) -> Vec<JobType> {
        self.registry.registered_types()
    }

    /// Whether a processor is registered for `job_type`.
    pub fn has_processor(&self, job_type: &JobType) -> bool {
        self.registry.contains(job_type)
    }

    /// Remove jobs older than the configured TTL at `now`.
    pub fn sweep_expired(&self, now: DateTime<Utc>) -> usize {
        let horizon =
            chrono::Duration::from_std(self.config.job_ttl()).unwrap_or(chrono::Duration::MAX);
        self.queue.sweep(now, horizon, self.config.sweep_in_flight)
    }

    /// Stop dispatching. Jobs waiting for a slot are failed.
    pub fn shutdown(&self) {
        self.runner.close();
        tracing::info!(
            "Job engine stopped dispatching ({} jobs still in flight)",
            self.queue.in_flight()
        );
    }
}

#[async_trait]
impl Sweeper for JobEngine {
    fn name(&self) -> &'static str {
        "jobs"
    }

    async fn sweep(&self) -> AppResult<usize> {
        let removed = self.sweep_expired(Utc::now());
        if removed > 0 {
            tracing::info!("Job sweep removed {} expired jobs", removed);
        }
        Ok(removed)
    }
}
