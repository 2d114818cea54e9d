//! Integration tests for progress synchronization.

mod helpers;

use practicehub_core::error::ErrorKind;
use practicehub_core::types::UserId;
use practicehub_entity::progress::{Draft, SolvedProblem, UserProgress};
use serde_json::json;

fn device_snapshot(slug: &str, timestamp: i64, code: &str) -> UserProgress {
    let mut progress = UserProgress::new(UserId::from("u1"));
    progress.solved_problems.push(SolvedProblem {
        slug: slug.to_string(),
        timestamp,
        code: code.to_string(),
        attempts: Some(1),
        best_runtime: None,
    });
    progress
}

#[test]
fn test_two_devices_converge_on_first_solve() {
    let app = helpers::TestApp::new();
    let user = UserId::from("u1");

    app.progress
        .merge(&user, device_snapshot("two-sum", 100, "device-a"))
        .unwrap();
    let merged = app
        .progress
        .merge(&user, device_snapshot("two-sum", 200, "device-b"))
        .unwrap();

    assert_eq!(merged.solved_problems.len(), 1);
    let entry = merged.solved("two-sum").unwrap();
    assert_eq!(entry.timestamp, 100);
    assert_eq!(entry.code, "device-a");
}

#[test]
fn test_client_json_snapshot_merges() {
    let app = helpers::TestApp::new();
    let user = UserId::from("u1");
    let client: UserProgress = serde_json::from_value(json!({
        "userId": "u1",
        "lastSyncedAt": 0,
        "solvedProblems": [{"slug": "valid-parentheses", "timestamp": 10, "code": "x"}],
        "drafts": {"two-sum": {"code": "wip", "updatedAt": 9}}
    }))
    .unwrap();

    let mut server = UserProgress::new(user.clone());
    server.drafts.insert(
        "two-sum".to_string(),
        Draft {
            code: "older".to_string(),
            updated_at: 5,
        },
    );
    app.progress.set(&user, server).unwrap();

    let merged = app.progress.merge(&user, client).unwrap();
    assert_eq!(merged.drafts["two-sum"].code, "wip");
    assert!(merged.is_solved("valid-parentheses"));

    let again = app.progress.merge(&user, merged.clone()).unwrap();
    assert_eq!(again.solved_problems, merged.solved_problems);
    assert_eq!(again.drafts, merged.drafts);
}

#[test]
fn test_progress_is_private_to_its_user() {
    let app = helpers::TestApp::new();
    let user = UserId::from("u1");
    app.progress.merge(&user, device_snapshot("a", 1, "x")).unwrap();

    let err = app
        .progress
        .get_for(&user, &UserId::from("u2"))
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Authorization);
}

#[test]
fn test_stale_users_are_swept() {
    let app = helpers::TestApp::new();
    let user = UserId::from("u1");
    let synced = app
        .progress
        .merge(&user, device_snapshot("a", 1, "x"))
        .unwrap()
        .last_synced_at;
    let horizon = (app.config.progress.ttl_seconds * 1000) as i64;

    assert_eq!(app.progress.sweep_at(synced + horizon), 0);
    assert_eq!(app.progress.sweep_at(synced + horizon + 1), 1);
    assert!(app.progress.get(&user).is_none());
    assert_eq!(app.progress.get_stats().total_users, 0);
}
