//! Job queue: the in-memory map of every job record.
//!
//! Each mutation goes through a single `DashMap` entry guard, so a status
//! transition and its timestamps are applied atomically with respect to
//! concurrent polls, listings and sweeps.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use tracing;

use practicehub_core::error::AppError;
use practicehub_core::result::AppResult;
use practicehub_core::types::{JobId, UserId};
use practicehub_entity::job::{Job, JobPayload, JobSnapshot, JobStats, JobStatus, JobType};

#[derive(Debug)]
struct StoredJob {
    /// Submission order, used for listing.
    seq: u64,
    job: Job,
}

/// In-memory job store with per-owner visibility and an admission limit.
#[derive(Debug)]
pub struct JobQueue {
    jobs: DashMap<JobId, StoredJob>,
    next_seq: AtomicU64,
    /// Number of stored jobs not yet in a terminal state.
    in_flight: AtomicUsize,
    /// Admission limit on `in_flight` (0 = unbounded).
    max_queued: usize,
}

impl JobQueue {
    /// Create a new job queue
    pub fn new(max_queued: usize) -> Self {
        Self {
            jobs: DashMap::new(),
            next_seq: AtomicU64::new(0),
            in_flight: AtomicUsize::new(0),
            max_queued,
        }
    }

    /// Store a new pending job.
    ///
    /// Fails with `ServiceUnavailable` when the admission limit is reached.
    pub fn enqueue(
        &self,
        owner_id: UserId,
        job_type: JobType,
        payload: JobPayload,
    ) -> AppResult<Job> {
        self.admit()?;

        let job = Job::new(owner_id, job_type, payload);
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.jobs.insert(
            job.id,
            StoredJob {
                seq,
                job: job.clone(),
            },
        );

        tracing::debug!(
            "Enqueued job: id={}, type='{}', owner='{}'",
            job.id,
            job.job_type,
            job.owner_id
        );

        Ok(job)
    }

    fn admit(&self) -> AppResult<()> {
        if self.max_queued == 0 {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            return Ok(());
        }
        self.in_flight
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| {
                (n < self.max_queued).then_some(n + 1)
            })
            .map(|_| ())
            .map_err(|n| {
                tracing::warn!("Rejected job submission: {} jobs already in flight", n);
                AppError::service_unavailable(format!(
                    "Job queue is full ({n} jobs pending or processing)"
                ))
            })
    }

    /// Projection of a job for `caller_id`.
    ///
    /// `Ok(None)` if the job does not exist, an authorization error if it
    /// belongs to someone else.
    pub fn get_for(&self, job_id: &JobId, caller_id: &UserId) -> AppResult<Option<JobSnapshot>> {
        let Some(stored) = self.jobs.get(job_id) else {
            return Ok(None);
        };
        if !stored.job.is_owned_by(caller_id) {
            tracing::warn!(
                "Access denied: user '{}' polled job {} owned by another user",
                caller_id,
                job_id
            );
            return Err(AppError::authorization(format!(
                "Job {job_id} does not belong to the caller"
            )));
        }
        Ok(Some(stored.job.snapshot()))
    }

    /// Up to `limit` of the caller's jobs, newest submission first.
    pub fn list_for(&self, caller_id: &UserId, limit: usize) -> Vec<JobSnapshot> {
        let mut owned: Vec<(u64, JobSnapshot)> = self
            .jobs
            .iter()
            .filter(|entry| entry.job.is_owned_by(caller_id))
            .map(|entry| (entry.seq, entry.job.snapshot()))
            .collect();
        owned.sort_by(|a, b| b.0.cmp(&a.0));
        owned.into_iter().take(limit).map(|(_, s)| s).collect()
    }

    /// Move a pending job to `processing` and return the updated copy.
    ///
    /// `Ok(None)` if the record is gone (swept while waiting).
    pub fn start(&self, job_id: &JobId) -> AppResult<Option<Job>> {
        let Some(mut stored) = self.jobs.get_mut(job_id) else {
            return Ok(None);
        };
        stored.job.start(Utc::now())?;
        tracing::debug!("Job processing: id={}", job_id);
        Ok(Some(stored.job.clone()))
    }

    /// Mark a processing job as completed.
    ///
    /// Returns `false` if the record no longer exists.
    pub fn complete(&self, job_id: &JobId, result: Value) -> AppResult<bool> {
        self.finish(job_id, |job, now| job.complete(result, now))
    }

    /// Mark a job as failed.
    ///
    /// Returns `false` if the record no longer exists.
    pub fn fail(&self, job_id: &JobId, error: &str) -> AppResult<bool> {
        self.finish(job_id, |job, now| job.fail(error, now))
    }

    fn finish(
        &self,
        job_id: &JobId,
        apply: impl FnOnce(&mut Job, DateTime<Utc>) -> AppResult<()>,
    ) -> AppResult<bool> {
        let Some(mut stored) = self.jobs.get_mut(job_id) else {
            return Ok(false);
        };
        apply(&mut stored.job, Utc::now())?;
        if stored.job.status.is_terminal() {
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }
        tracing::debug!("Job {}: id={}", stored.job.status, job_id);
        Ok(true)
    }

    /// Remove jobs whose age at `now` is strictly greater than `horizon`.
    ///
    /// Pending and processing jobs are kept unless `include_in_flight` is set.
    /// Returns the number of removed records.
    pub fn sweep(
        &self,
        now: DateTime<Utc>,
        horizon: chrono::Duration,
        include_in_flight: bool,
    ) -> usize {
        let mut removed = 0;
        self.jobs.retain(|_, stored| {
            if stored.job.age(now) <= horizon {
                return true;
            }
            if !stored.job.status.is_terminal() {
                if !include_in_flight {
                    return true;
                }
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            removed += 1;
            false
        });
        removed
    }

    /// Counts by status.
    pub fn stats(&self) -> JobStats {
        let mut stats = JobStats::default();
        for entry in self.jobs.iter() {
            stats.total += 1;
            stats.by_status.record(entry.job.status);
        }
        stats
    }

    /// Number of jobs not yet in a terminal state.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
impl JobQueue {
    /// Copy of a job record, without an ownership check.
    pub(crate) fn get(&self, job_id: &JobId) -> Option<Job> {
        self.jobs.get(job_id).map(|stored| stored.job.clone())
    }
}
