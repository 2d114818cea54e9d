//! Integration tests for the TTL cache.

mod helpers;

use std::time::Duration;

use practicehub_core::traits::cache::CacheProvider;
use practicehub_core::traits::sweeper::Sweeper;
use serde_json::{Value, json};

#[tokio::test]
async fn test_memoizes_ai_response() {
    let app = helpers::TestApp::new();
    let key = "ai:hint:two-sum";

    let first: Value = app
        .cache
        .get_or_insert_json(key, Duration::from_secs(60), || async {
            Ok(json!({"hint": "try a hash map"}))
        })
        .await
        .unwrap();
    let second: Value = app
        .cache
        .get_or_insert_json(key, Duration::from_secs(60), || async {
            Ok(json!({"hint": "should not be called"}))
        })
        .await
        .unwrap();

    assert_eq!(first, second);
    let stats = app.cache.stats().await.unwrap();
    assert_eq!(stats.keys, 1);
    assert_eq!(stats.hits, 1);
}

#[tokio::test]
async fn test_expired_entries_are_scanned_out() {
    let app = helpers::TestApp::new();
    app.cache
        .set("short", "v", Duration::from_millis(20))
        .await
        .unwrap();
    app.cache.set_default("long", "v").await.unwrap();

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(app.cache.sweep().await.unwrap(), 1);

    assert!(!app.cache.exists("short").await.unwrap());
    assert!(app.cache.exists("long").await.unwrap());
    assert_eq!(app.cache.delete("long").await.unwrap(), 1);
    assert!(app.cache.health_check().await.unwrap());
}
