//! Integration tests for the SQLite telemetry store on a file database
//!
//! These exercise the pooled, WAL-mode setup the service runs with.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::sync::Arc;

use application::ports::TelemetryStorePort;
use domain::{Claim, ErrorRecord, Headers, RequestRecord, ResponseRecord};
use infrastructure::{AsyncDatabase, DatabaseConfig, SqliteTelemetryStore};
use tempfile::TempDir;

// ============================================================================
// Test Helpers
// ============================================================================

async fn create_file_db(dir: &TempDir) -> AsyncDatabase {
    let config = DatabaseConfig {
        url: format!("sqlite:{}", dir.path().join("telemetry.db").display()),
        ..DatabaseConfig::default()
    };
    let db = AsyncDatabase::new(&config.to_async_config())
        .await
        .expect("Failed to open database");
    db.migrate().await.expect("Failed to run migrations");
    db
}

// ============================================================================
// Store Tests
// ============================================================================

#[tokio::test]
async fn concurrent_writes_all_land() {
    let dir = TempDir::new().unwrap();
    let db = create_file_db(&dir).await;
    let store = Arc::new(SqliteTelemetryStore::new(db.pool().clone()));

    let handles: Vec<_> = (0..20)
        .map(|i| {
            let store = Arc::clone(&store);
            tokio::spawn(async move {
                let mut record = RequestRecord::new();
                record.url = Some(format!("/orders/{i}"));
                let id = record.id();
                assert!(store.add_request(&record).await.unwrap());
                id
            })
        })
        .collect();

    for handle in handles {
        let id = handle.await.unwrap();
        assert!(store.find_request(id).await.unwrap().is_some());
    }
}

#[tokio::test]
async fn records_survive_reopening() {
    let dir = TempDir::new().unwrap();

    let mut record = RequestRecord::new();
    record.username = Some("alice".into());
    record.request_headers = Headers::new().with("Accept", "*/*");
    record.claims = vec![Claim::new("role", "admin")];
    let id = record.id();

    {
        let db = create_file_db(&dir).await;
        let store = SqliteTelemetryStore::new(db.pool().clone());
        assert!(store.add_request(&record).await.unwrap());
        db.close().await;
    }

    let db = create_file_db(&dir).await;
    let store = SqliteTelemetryStore::new(db.pool().clone());
    let restored = store.find_request(id).await.unwrap().unwrap();
    assert_eq!(restored, record);
}

#[tokio::test]
async fn full_json_column_holds_complete_record() {
    let dir = TempDir::new().unwrap();
    let db = create_file_db(&dir).await;
    let store = SqliteTelemetryStore::new(db.pool().clone());

    let mut record = ErrorRecord::new();
    record.error_type = Some("TimeoutError".into());
    record.request_headers = Headers::new().with("X-Request-Id", "abc");
    store.add_error(&record).await.unwrap();

    let json: String = sqlx::query_scalar("SELECT full_json FROM error_log WHERE id = $1")
        .bind(record.id().to_string())
        .fetch_one(db.pool())
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "TimeoutError");
    assert_eq!(value["requestHeaders"]["X-Request-Id"][0], "abc");
}

#[tokio::test]
async fn response_without_request_link_is_stored() {
    let dir = TempDir::new().unwrap();
    let db = create_file_db(&dir).await;
    let store = SqliteTelemetryStore::new(db.pool().clone());

    let mut record = ResponseRecord::new();
    record.http_status_code = Some(204);
    assert!(store.add_response(&record).await.unwrap());

    let restored = store.find_response(record.id()).await.unwrap().unwrap();
    assert_eq!(restored.request_id, None);
    assert_eq!(restored.http_status_code, Some(204));
}
