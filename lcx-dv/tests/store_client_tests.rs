//! Integration tests for the dashboard against a live response store
//!
//! Each test serves the lcx-rs router on an ephemeral local port backed by a
//! temporary database.

use std::sync::Arc;
use std::time::Duration;

use lcx_common::events::EventBus;
use lcx_common::{summarize, validate, AggregationOptions, CandidateResponse};
use lcx_dv::{ClientError, RefreshLoop, StoreClient};
use lcx_rs::{build_router, AppState};
use tempfile::TempDir;

const TIMEOUT: Duration = Duration::from_millis(2000);

/// Test helper: running store plus the temp folder that must outlive it
async fn spawn_store() -> (TempDir, String) {
    let dir = tempfile::tempdir().expect("Should create temp dir");
    let pool = lcx_common::db::init_database(&dir.path().join("lcx.db"))
        .await
        .expect("Should initialize test database");
    let app = build_router(AppState::new(pool, EventBus::new(16)));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Should bind ephemeral port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (dir, format!("http://{}", addr))
}

/// URL nothing listens on
async fn dead_store_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

fn candidate(name: &str, skills: [&str; 3]) -> CandidateResponse {
    CandidateResponse {
        name: Some(name.to_string()),
        sector: Some("education".to_string()),
        other_sector: None,
        origin: Some("Valencia".to_string()),
        linkedin_url: Some("https://www.linkedin.com/in/someone".to_string()),
        profile_description: Some("Educator turned founder".to_string()),
        event_goal: Some("Find a cofounder".to_string()),
        networking_interest: Some("business".to_string()),
        other_networking_interest: None,
        desired_connections: Some("Technical cofounders".to_string()),
        offer_to_others: Some("Curriculum design".to_string()),
        key_skills: Some(skills.iter().map(|s| s.to_string()).collect()),
    }
}

#[tokio::test]
async fn test_submit_then_list_round_trip() {
    let (_dir, url) = spawn_store().await;
    let client = StoreClient::new(&url, TIMEOUT).unwrap();

    let submission = validate(&candidate("Maria", ["Teaching", "Sales", "Python"])).unwrap();
    let stored = client.submit(&submission).await.expect("submit should succeed");
    assert_eq!(stored.id, 1);
    assert_eq!(stored.name, "Maria");

    let listed = client.list_responses().await.unwrap();
    assert_eq!(listed, vec![stored]);
}

#[tokio::test]
async fn test_list_empty_store() {
    let (_dir, url) = spawn_store().await;
    let client = StoreClient::new(&url, TIMEOUT).unwrap();

    assert!(client.list_responses().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_store_is_network_error() {
    let client = StoreClient::new(&dead_store_url().await, TIMEOUT).unwrap();

    let submission = validate(&candidate("Maria", ["a", "b", "c"])).unwrap();
    assert!(matches!(
        client.submit(&submission).await,
        Err(ClientError::Network(_))
    ));
    assert!(matches!(
        client.list_responses().await,
        Err(ClientError::Network(_))
    ));
}

#[tokio::test]
async fn test_refresh_loop_picks_up_new_submissions() {
    let (_dir, url) = spawn_store().await;
    let client = StoreClient::new(&url, TIMEOUT).unwrap();

    let handle = RefreshLoop::new(Arc::new(client.clone()), Duration::from_millis(50)).spawn();
    let mut snapshots = handle.subscribe();

    // Initial fetch of the empty store
    tokio::time::timeout(Duration::from_secs(5), snapshots.changed())
        .await
        .expect("initial fetch")
        .unwrap();
    assert!(handle.latest().is_loaded());
    assert!(handle.latest().responses.is_empty());

    for (name, skills) in [
        ("Ana", ["Rust", "SQL", "Design"]),
        ("Ben", ["rust", "Go", "Design"]),
    ] {
        let submission = validate(&candidate(name, skills)).unwrap();
        client.submit(&submission).await.unwrap();
    }

    tokio::time::timeout(Duration::from_secs(5), async {
        while snapshots.borrow_and_update().responses.len() < 2 {
            snapshots.changed().await.unwrap();
        }
    })
    .await
    .expect("refresh should pick up both submissions");

    let snapshot = handle.latest();
    let summary = summarize(&snapshot.responses, &AggregationOptions::default());
    assert_eq!(summary.total_responses, 2);
    assert_eq!(summary.top_skills[0].label, "design");
    assert_eq!(summary.top_skills[0].count, 2);
    assert_eq!(summary.top_skills[1].label, "rust");
    assert_eq!(summary.recent_profiles[0].name, "Ben");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_refresh_loop_keeps_empty_snapshot_when_store_is_down() {
    let client = StoreClient::new(&dead_store_url().await, Duration::from_millis(200)).unwrap();
    let handle = RefreshLoop::new(Arc::new(client), Duration::from_millis(50)).spawn();

    tokio::time::sleep(Duration::from_millis(300)).await;

    let snapshot = handle.latest();
    assert_eq!(snapshot.seq, 0);
    assert!(!snapshot.is_loaded());

    handle.shutdown().await;
}
