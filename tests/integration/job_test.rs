//! Integration tests for the job engine.

mod helpers;

use practicehub_core::error::ErrorKind;
use practicehub_core::types::{JobId, UserId};
use practicehub_entity::job::{Job, JobStatus, JobType};
use practicehub_worker::{ProcessorError, processor_fn};
use serde_json::{Value, json};

#[tokio::test]
async fn test_execute_job_echoes_payload() {
    let app = helpers::TestApp::new();
    app.jobs.register_processor(
        JobType::EXECUTE,
        processor_fn(|job: Job| async move { Ok(Value::Object(job.payload)) }),
    );
    let owner = UserId::from("u1");

    let job_id = app
        .jobs
        .submit(owner.clone(), JobType::EXECUTE, helpers::payload(json!({"code": "return 1"})))
        .unwrap();
    let status = app.jobs.get_job(&job_id, &owner).unwrap().unwrap().status;
    assert!(matches!(status, JobStatus::Pending | JobStatus::Processing));

    let done = app.wait_for_job(&job_id, &owner).await;
    assert_eq!(done.status, JobStatus::Completed);
    assert_eq!(done.result, Some(json!({"code": "return 1"})));
    assert!(done.error.is_none());
}

#[tokio::test]
async fn test_unknown_type_fails_naming_processor() {
    let app = helpers::TestApp::new();
    let owner = UserId::from("u1");

    let job_id = app
        .jobs
        .submit(owner.clone(), "unknown_type", helpers::payload(json!({})))
        .unwrap();
    let done = app.wait_for_job(&job_id, &owner).await;

    assert_eq!(done.status, JobStatus::Failed);
    assert!(done.result.is_none());
    let error = done.error.unwrap();
    assert!(error.contains("No processor registered"));
    assert!(error.contains("unknown_type"));
}

#[tokio::test]
async fn test_failing_processor_reports_error() {
    let app = helpers::TestApp::new();
    app.jobs.register_processor(
        JobType::AI_EXPLAIN,
        processor_fn(|_job| async { Err(ProcessorError::failed("upstream returned 503")) }),
    );
    let owner = UserId::from("u1");

    let job_id = app
        .jobs
        .submit(owner.clone(), JobType::AI_EXPLAIN, helpers::payload(json!({"slug": "two-sum"})))
        .unwrap();
    let done = app.wait_for_job(&job_id, &owner).await;

    assert_eq!(done.status, JobStatus::Failed);
    assert_eq!(done.error.as_deref(), Some("upstream returned 503"));
    assert!(done.result.is_none());
}

#[tokio::test]
async fn test_jobs_are_private_to_their_owner() {
    let app = helpers::TestApp::new();
    app.jobs.register_processor(JobType::AI_HINT, processor_fn(|_job| async { Ok(json!("hint")) }));
    let alice = UserId::from("alice");
    let bob = UserId::from("bob");

    let job_id = app
        .jobs
        .submit(alice.clone(), JobType::AI_HINT, helpers::payload(json!({})))
        .unwrap();

    let err = app.jobs.get_job(&job_id, &bob).unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
    assert!(err.is_access_denied());
    assert!(app.jobs.get_user_jobs(&bob, None).is_empty());
    assert!(app.jobs.get_job(&JobId::new(), &bob).unwrap().is_none());

    app.wait_for_job(&job_id, &alice).await;
    let listed = app.jobs.get_user_jobs(&alice, None);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, job_id);
}

#[tokio::test]
async fn test_stats_count_terminal_states() {
    let app = helpers::TestApp::new();
    app.jobs.register_processor(JobType::EXECUTE, processor_fn(|_job| async { Ok(json!(1)) }));
    let owner = UserId::from("u1");

    let ok = app
        .jobs
        .submit(owner.clone(), JobType::EXECUTE, helpers::payload(json!({})))
        .unwrap();
    let bad = app
        .jobs
        .submit(owner.clone(), "unknown_type", helpers::payload(json!({})))
        .unwrap();
    app.wait_for_job(&ok, &owner).await;
    app.wait_for_job(&bad, &owner).await;

    let stats = app.jobs.get_stats();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.by_status.completed, 1);
    assert_eq!(stats.by_status.failed, 1);
}

#[tokio::test]
async fn test_sweep_removes_only_expired_terminal_jobs() {
    let app = helpers::TestApp::new();
    let owner = UserId::from("u1");
    let job_id = app
        .jobs
        .submit(owner.clone(), "unknown_type", helpers::payload(json!({})))
        .unwrap();
    app.wait_for_job(&job_id, &owner).await;

    let ttl = chrono::Duration::from_std(app.config.worker.job_ttl()).unwrap();
    let now = chrono::Utc::now();
    assert_eq!(app.jobs.sweep_expired(now), 0);
    assert_eq!(app.jobs.sweep_expired(now + ttl + chrono::Duration::seconds(1)), 1);
    assert!(app.jobs.get_job(&job_id, &owner).unwrap().is_none());
}
