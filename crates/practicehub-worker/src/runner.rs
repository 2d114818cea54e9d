//! Job runner: dispatches each submitted job on its own task.
//!
//! The runner owns the concurrency slots and the event channel. Every
//! handler outcome, including a panic, is written back into the queue as a
//! status transition; nothing escapes the spawned task.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde::Serialize;
use tokio::sync::{Semaphore, broadcast};
use tracing;

use practicehub_core::result::AppResult;
use practicehub_core::types::{JobId, UserId};
use practicehub_entity::job::{Job, JobStatus};

use crate::executor::ProcessorRegistry;
use crate::queue::JobQueue;

/// A job status transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobEvent {
    pub job_id: JobId,
    pub owner_id: UserId,
    pub status: JobStatus,
}

impl JobEvent {
    fn of(job: &Job, status: JobStatus) -> Self {
        Self {
            job_id: job.id,
            owner_id: job.owner_id.clone(),
            status,
        }
    }
}

/// Dispatches jobs to their processors.
#[derive(Debug, Clone)]
pub struct JobRunner {
    queue: Arc<JobQueue>,
    registry: Arc<ProcessorRegistry>,
    /// Bounds the number of processors running at once
    slots: Arc<Semaphore>,
    events: broadcast::Sender<JobEvent>,
}

impl JobRunner {
    /// Create a runner with `concurrency` slots and an event buffer of
    /// `event_buffer` entries. Both are clamped to at least one.
    pub fn new(
        queue: Arc<JobQueue>,
        registry: Arc<ProcessorRegistry>,
        concurrency: usize,
        event_buffer: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(event_buffer.max(1));
        Self {
            queue,
            registry,
            slots: Arc::new(Semaphore::new(concurrency.max(1))),
            events,
        }
    }

    /// Receive every subsequent status transition.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    /// Publish a transition. Having no subscribers is not an error.
    pub fn publish(&self, job: &Job, status: JobStatus) {
        let _ = self.events.send(JobEvent::of(job, status));
    }

    /// Spawn the dispatch of `job` without waiting for it.
    pub fn dispatch(&self, job: Job) {
        let runner = self.clone();
        tokio::spawn(async move {
            runner.run(job).await;
        });
    }

    /// Run a pending job to a terminal state.
    pub async fn run(&self, job: Job) {
        let Some(processor) = self.registry.get(&job.job_type) else {
            let message = format!("No processor registered for job type: {}", job.job_type);
            tracing::warn!("Job {} failed: {}", job.id, message);
            let outcome = self.queue.fail(&job.id, &message);
            self.settle(&job, JobStatus::Failed, outcome);
            return;
        };

        let _permit = match Arc::clone(&self.slots).acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                let outcome = self.queue.fail(&job.id, "Job engine is shutting down");
                self.settle(&job, JobStatus::Failed, outcome);
                return;
            }
        };

        let job = match self.queue.start(&job.id) {
            Ok(Some(job)) => job,
            Ok(None) => {
                tracing::warn!("Job {} was swept before it started", job.id);
                return;
            }
            Err(e) => {
                tracing::error!("Failed to start job {}: {}", job.id, e);
                return;
            }
        };
        self.publish(&job, JobStatus::Processing);

        tracing::info!("Processing job: id={}, type='{}'", job.id, job.job_type);

        match AssertUnwindSafe(processor.process(&job)).catch_unwind().await {
            Ok(Ok(result)) => {
                let outcome = self.queue.complete(&job.id, result);
                self.settle(&job, JobStatus::Completed, outcome);
            }
            Ok(Err(e)) => {
                tracing::warn!("Job {} failed: {}", job.id, e);
                let outcome = self.queue.fail(&job.id, &e.to_string());
                self.settle(&job, JobStatus::Failed, outcome);
            }
            Err(panic) => {
                let message = format!("processor panicked: {}", panic_message(panic.as_ref()));
                tracing::error!("Job {} failed: {}", job.id, message);
                let outcome = self.queue.fail(&job.id, &message);
                self.settle(&job, JobStatus::Failed, outcome);
            }
        }
    }

    /// Stop handing out slots. Jobs still waiting fail instead of running.
    pub fn close(&self) {
        self.slots.close();
    }

    fn settle(&self, job: &Job, status: JobStatus, outcome: AppResult<bool>) {
        match outcome {
            Ok(true) => {
                tracing::info!("Job {} {}", job.id, status);
                self.publish(job, status);
            }
            Ok(false) => {
                tracing::warn!(
                    "Discarding {} outcome for job {}: record was swept",
                    status,
                    job.id
                );
            }
            Err(e) => {
                tracing::error!("Failed to record outcome for job {}: {}", job.id, e);
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
