//! Job entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use practicehub_core::error::AppError;
use practicehub_core::result::AppResult;
use practicehub_core::types::{JobId, UserId};

use super::kind::JobType;
use super::status::JobStatus;

/// Opaque key/value bag submitted with a job.
pub type JobPayload = serde_json::Map<String, Value>;

/// A unit of asynchronous work.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    /// Unique job identifier.
    pub id: JobId,
    /// User who submitted the job. Never changes.
    pub owner_id: UserId,
    /// Type used to pick the processor.
    pub job_type: JobType,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Submitted payload.
    pub payload: JobPayload,
    /// Processor output, present only when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message, present only when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the job was submitted.
    pub created_at: DateTime<Utc>,
    /// When the status last changed.
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job.
    pub fn new(owner_id: UserId, job_type: JobType, payload: JobPayload) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::new(),
            owner_id,
            job_type,
            status: JobStatus::Pending,
            payload,
            result: None,
            error: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether `user_id` owns this job.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner_id == user_id
    }

    /// Age of the job at `now`.
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }

    /// Move to `processing`.
    pub fn start(&mut self, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(JobStatus::Processing, now)
    }

    /// Move to `completed` with the processor's output.
    pub fn complete(&mut self, result: Value, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(JobStatus::Completed, now)?;
        self.result = Some(result);
        self.error = None;
        Ok(())
    }

    /// Move to `failed` with a human-readable message.
    pub fn fail(&mut self, error: impl Into<String>, now: DateTime<Utc>) -> AppResult<()> {
        self.transition(JobStatus::Failed, now)?;
        self.error = Some(error.into());
        self.result = None;
        Ok(())
    }

    fn transition(&mut self, next: JobStatus, now: DateTime<Utc>) -> AppResult<()> {
        if !self.status.can_transition_to(next) {
            return Err(AppError::validation(format!(
                "Invalid job transition for {}: {} -> {}",
                self.id, self.status, next
            )));
        }
        self.status = next;
        self.updated_at = now;
        Ok(())
    }

    /// Read-only projection returned to pollers.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            status: self.status,
            result: self.result.clone(),
            error: self.error.clone(),
        }
    }
}

/// What a poller sees of a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSnapshot {
    /// Job identifier.
    pub id: JobId,
    /// Current status.
    pub status: JobStatus,
    /// Processor output, when completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Failure message, when failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Number of jobs in each status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub completed: usize,
    pub failed: usize,
}

impl StatusCounts {
    /// Count one more job with `status`.
    pub fn record(&mut self, status: JobStatus) {
        match status {
            JobStatus::Pending => self.pending += 1,
            JobStatus::Processing => self.processing += 1,
            JobStatus::Completed => self.completed += 1,
            JobStatus::Failed => self.failed += 1,
        }
    }
}

/// Job store statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    /// Number of stored jobs.
    pub total: usize,
    /// Breakdown by status.
    pub by_status: StatusCounts,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending_job() -> Job {
        let payload = json!({"code": "return 1"}).as_object().cloned().unwrap();
        Job::new(UserId::from("u1"), JobType::EXECUTE, payload)
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = pending_job();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.created_at, job.updated_at);
        assert!(job.result.is_none() && job.error.is_none());
    }

    #[test]
    fn test_complete_sets_result_and_updated_at() {
        let mut job = pending_job();
        let later = job.created_at + chrono::Duration::seconds(2);
        job.start(later).unwrap();
        job.complete(json!({"ok": true}), later).unwrap();
        assert_eq!(job.status, JobStatus::Completed);
        assert_eq!(job.result, Some(json!({"ok": true})));
        assert!(job.error.is_none());
        assert_eq!(job.updated_at, later);
    }

    #[test]
    fn test_cannot_complete_without_processing() {
        let mut job = pending_job();
        let err = job.complete(json!(1), Utc::now()).unwrap_err();
        assert_eq!(err.kind, practicehub_core::error::ErrorKind::Validation);
        assert_eq!(job.status, JobStatus::Pending);
    }

    #[test]
    fn test_pending_can_fail_directly() {
        let mut job = pending_job();
        job.fail("No processor registered", Utc::now()).unwrap();
        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.start(Utc::now()).is_err());
    }

    #[test]
    fn test_snapshot_omits_absent_fields() {
        let job = pending_job();
        let json = serde_json::to_value(job.snapshot()).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json.get("result").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_stats_serialize_camel_case() {
        let mut by_status = StatusCounts::default();
        by_status.record(JobStatus::Pending);
        by_status.record(JobStatus::Failed);
        let stats = JobStats { total: 2, by_status };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["byStatus"]["pending"], 1);
        assert_eq!(json["byStatus"]["failed"], 1);
    }
}
