/*!
Tests for the database check catalog.

Each check runs against an in-memory session so reply shapes and display
formatting can be asserted exactly.
*/

use crate::common::{FakeCollection, FakeSession};
use devprobe::core::db::checks::SAMPLE_LIMIT_ZERO;
use devprobe::core::db::{database_registry, DbSession, DEFAULT_SAMPLE_LIMIT};
use devprobe::core::report::CheckResult;
use serde_json::json;

async fn run_check(session: &FakeSession, name: &str) -> CheckResult {
    let registry = database_registry(DEFAULT_SAMPLE_LIMIT);
    let target: &DbSession = session;
    registry.dispatch(name, target).await
}

#[test]
fn test_catalog_names_in_order() {
    let registry = database_registry(DEFAULT_SAMPLE_LIMIT);
    assert_eq!(
        registry.names(),
        vec![
            "connection",
            "list-databases",
            "list-collections",
            "count-documents",
            "sample-documents",
            "indexes",
            "server-status",
            "db-stats",
        ]
    );
}

#[tokio::test]
async fn test_connection_check() {
    let session = FakeSession::default();
    let result = run_check(&session, "connection").await;

    assert!(result.success());
    assert_eq!(result.test(), "Connection Test");
    assert_eq!(
        result.data(),
        Some(&json!({ "status": "Connected successfully", "database": "inventory" }))
    );
}

#[tokio::test]
async fn test_connection_check_ping_failure() {
    let session = FakeSession {
        failing: vec!["ping"],
        ..FakeSession::default()
    };
    let result = run_check(&session, "connection").await;

    assert!(!result.success());
    assert_eq!(result.test(), "connection");
    assert_eq!(result.error(), Some("ping failed"));
}

#[tokio::test]
async fn test_list_databases_formats_sizes() {
    let session = FakeSession::default();
    let result = run_check(&session, "list-databases").await;

    assert_eq!(result.test(), "List Databases");
    assert_eq!(
        result.data(),
        Some(&json!({
            "count": 2,
            "databases": [
                { "name": "admin", "sizeOnDisk": "1.00 MB", "empty": false },
                { "name": "inventory", "sizeOnDisk": "1.43 MB", "empty": false },
            ]
        }))
    );
}

#[tokio::test]
async fn test_list_collections() {
    let session = FakeSession::default();
    let result = run_check(&session, "list-collections").await;

    assert_eq!(
        result.data(),
        Some(&json!({ "database": "inventory", "count": 2, "collections": ["a", "b"] }))
    );
}

#[tokio::test]
async fn test_count_documents_totals() {
    let session = FakeSession::default();
    let result = run_check(&session, "count-documents").await;

    assert_eq!(result.test(), "Count Documents");
    let data = result.data().unwrap();
    assert_eq!(data["documentCounts"], json!({ "a": 3, "b": 5 }));
    assert_eq!(data["totalDocuments"], json!(8));
}

#[tokio::test]
async fn test_count_documents_keeps_listing_order() {
    let session = FakeSession {
        collections: vec![
            FakeCollection::with_documents("zebra", 1),
            FakeCollection::with_documents("apple", 2),
        ],
        ..FakeSession::default()
    };
    let result = run_check(&session, "count-documents").await;

    let counts = result.data().unwrap()["documentCounts"].as_object().unwrap();
    let keys: Vec<&String> = counts.keys().collect();
    assert_eq!(keys, vec!["zebra", "apple"]);
}

#[tokio::test]
async fn test_sample_documents_respects_limit() {
    let session = FakeSession {
        collections: vec![
            FakeCollection::with_documents("big", 12),
            FakeCollection::with_documents("small", 2),
        ],
        ..FakeSession::default()
    };
    let result = run_check(&session, "sample-documents").await;

    let samples = &result.data().unwrap()["samples"];
    assert_eq!(samples["big"].as_array().unwrap().len(), 5);
    assert_eq!(samples["big"][0], json!({ "_id": 0 }));
    assert_eq!(samples["small"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sample_documents_custom_limit() {
    let session = FakeSession::default();
    let registry = database_registry(1);
    let target: &DbSession = &session;
    let result = registry.dispatch("sample-documents", target).await;

    let samples = &result.data().unwrap()["samples"];
    assert_eq!(samples["a"].as_array().unwrap().len(), 1);
    assert_eq!(samples["b"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_sample_documents_zero_limit_rejected() {
    let session = FakeSession::default();
    let registry = database_registry(0);
    let target: &DbSession = &session;
    let result = registry.dispatch("sample-documents", target).await;

    assert!(!result.success());
    assert_eq!(result.test(), "sample-documents");
    assert_eq!(result.error(), Some(SAMPLE_LIMIT_ZERO));
}

#[tokio::test]
async fn test_indexes_per_collection() {
    let session = FakeSession::default();
    let result = run_check(&session, "indexes").await;

    assert_eq!(result.test(), "List Indexes");
    let indexes = &result.data().unwrap()["indexes"];
    assert_eq!(indexes["a"][0]["name"], json!("_id_"));
    assert_eq!(indexes["b"][0]["key"], json!({ "_id": 1 }));
}

#[tokio::test]
async fn test_server_status_formatting() {
    let session = FakeSession::default();
    let result = run_check(&session, "server-status").await;

    assert_eq!(result.test(), "Server Status");
    assert_eq!(
        result.data(),
        Some(&json!({
            "version": "7.0.4",
            "uptime": "2 hours",
            "connections": { "current": 4, "available": 834 },
            "network": {
                "bytesIn": "1.00 MB",
                "bytesOut": "1.43 MB",
                "numRequests": 42,
            },
            "memory": { "resident": "128 MB", "virtual": "2048.5 MB" },
        }))
    );
}

#[tokio::test]
async fn test_server_status_missing_field_fails() {
    let session = FakeSession {
        server_status: json!({ "version": "7.0.4", "uptime": 10 }),
        ..FakeSession::default()
    };
    let result = run_check(&session, "server-status").await;

    assert!(!result.success());
    assert_eq!(result.test(), "server-status");
    assert_eq!(result.error(), Some("Reply is missing field 'connections'"));
}

#[tokio::test]
async fn test_db_stats_formatting() {
    let session = FakeSession::default();
    let result = run_check(&session, "db-stats").await;

    assert_eq!(result.test(), "Database Stats");
    assert_eq!(
        result.data(),
        Some(&json!({
            "database": "inventory",
            "collections": 2,
            "views": 0,
            "objects": 8,
            "avgObjSize": "1.50 KB",
            "dataSize": "2.00 MB",
            "storageSize": "1.00 MB",
            "indexes": 2,
            "indexSize": "0.50 MB",
        }))
    );
}

#[tokio::test]
async fn test_db_stats_absent_counters_are_null() {
    let session = FakeSession {
        db_stats: json!({
            "avgObjSize": 0,
            "dataSize": 0,
            "storageSize": 0,
            "indexSize": 0,
        }),
        ..FakeSession::default()
    };
    let result = run_check(&session, "db-stats").await;

    let data = result.data().unwrap();
    assert_eq!(data["views"], json!(null));
    assert_eq!(data["avgObjSize"], json!("0.00 KB"));
}

#[tokio::test]
async fn test_command_failure_becomes_failing_result() {
    let session = FakeSession {
        failing: vec!["listCollections"],
        ..FakeSession::default()
    };
    let result = run_check(&session, "indexes").await;

    assert!(!result.success());
    assert_eq!(result.test(), "indexes");
    assert_eq!(result.error(), Some("listCollections failed"));
    assert!(result.data().is_none());
}
