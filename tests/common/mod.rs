//! Common test utilities: in-memory database sessions and a scripted
//! forwarding transport

#![allow(dead_code)]

use devprobe::core::db::{Connector, DatabaseInfo, DbSession, Session};
use devprobe::core::http::{ForwardClient, OutboundRequest, RawResponse};
use devprobe::core::registry::Check;
use devprobe::core::types::{CheckError, DiagnosticError};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Test helper to create a temporary directory for test files
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

#[derive(Debug, Clone)]
pub struct FakeCollection {
    pub name: String,
    pub documents: Vec<Value>,
    pub indexes: Vec<Value>,
}

impl FakeCollection {
    /// Collection holding `count` documents `{_id: i}` and the default `_id_` index
    pub fn with_documents(name: &str, count: usize) -> Self {
        Self {
            name: name.to_string(),
            documents: (0..count).map(|i| json!({ "_id": i })).collect(),
            indexes: vec![json!({ "v": 2, "key": { "_id": 1 }, "name": "_id_" })],
        }
    }
}

/// In-memory session serving canned replies
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub database: String,
    pub databases: Vec<DatabaseInfo>,
    pub collections: Vec<FakeCollection>,
    pub server_status: Value,
    pub db_stats: Value,
    /// Operations that answer with a command error
    pub failing: Vec<&'static str>,
    pub closes: Arc<AtomicUsize>,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self {
            database: "inventory".to_string(),
            databases: vec![
                DatabaseInfo {
                    name: "admin".to_string(),
                    size_on_disk: 1_048_576,
                    empty: false,
                },
                DatabaseInfo {
                    name: "inventory".to_string(),
                    size_on_disk: 1_500_000,
                    empty: false,
                },
            ],
            collections: vec![
                FakeCollection::with_documents("a", 3),
                FakeCollection::with_documents("b", 5),
            ],
            server_status: json!({
                "version": "7.0.4",
                "uptime": 7384,
                "connections": { "current": 4, "available": 834 },
                "network": { "bytesIn": 1_048_576, "bytesOut": 1_500_000, "numRequests": 42 },
                "mem": { "resident": 128, "virtual": 2048.5 },
            }),
            db_stats: json!({
                "db": "inventory",
                "collections": 2,
                "views": 0,
                "objects": 8,
                "avgObjSize": 1536,
                "dataSize": 2_097_152,
                "storageSize": 1_048_576,
                "indexes": 2,
                "indexSize": 524_288,
            }),
            failing: Vec::new(),
            closes: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl FakeSession {
    fn fail_if(&self, operation: &'static str) -> Result<(), CheckError> {
        if self.failing.contains(&operation) {
            Err(CheckError::Command(format!("{} failed", operation)))
        } else {
            Ok(())
        }
    }

    fn collection(&self, name: &str) -> Result<&FakeCollection, CheckError> {
        self.collections
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| CheckError::Command(format!("ns not found: {}", name)))
    }
}

#[async_trait::async_trait]
impl Session for FakeSession {
    fn database_name(&self) -> &str {
        &self.database
    }

    async fn ping(&self) -> Result<(), CheckError> {
        self.fail_if("ping")
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, CheckError> {
        self.fail_if("listDatabases")?;
        Ok(self.databases.clone())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, CheckError> {
        self.fail_if("listCollections")?;
        Ok(self.collections.iter().map(|c| c.name.clone()).collect())
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, CheckError> {
        self.fail_if("count")?;
        Ok(self.collection(collection)?.documents.len() as u64)
    }

    async fn sample_documents(
        &self,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<Value>, CheckError> {
        self.fail_if("find")?;
        Ok(self
            .collection(collection)?
            .documents
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, CheckError> {
        self.fail_if("listIndexes")?;
        Ok(self.collection(collection)?.indexes.clone())
    }

    async fn server_status(&self) -> Result<Value, CheckError> {
        self.fail_if("serverStatus")?;
        Ok(self.server_status.clone())
    }

    async fn db_stats(&self) -> Result<Value, CheckError> {
        self.fail_if("dbStats")?;
        Ok(self.db_stats.clone())
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        let closes = self.closes.clone();
        Box::pin(async move {
            closes.fetch_add(1, Ordering::SeqCst);
        })
    }
}

/// Connector handing out clones of one fake session, or failing every open
pub struct FakeConnector {
    session: FakeSession,
    open_error: Option<String>,
    pub opens: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub last_timeout: Mutex<Option<Duration>>,
}

impl FakeConnector {
    pub fn new(session: FakeSession) -> Self {
        let closes = session.closes.clone();
        Self {
            session,
            open_error: None,
            opens: Arc::new(AtomicUsize::new(0)),
            closes,
            last_timeout: Mutex::new(None),
        }
    }

    pub fn unreachable(message: &str) -> Self {
        let mut connector = Self::new(FakeSession::default());
        connector.open_error = Some(message.to_string());
        connector
    }

    pub fn open_count(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Connector for FakeConnector {
    async fn open(
        &self,
        _connection_string: &str,
        connect_timeout: Duration,
    ) -> Result<Box<dyn Session>, DiagnosticError> {
        *self.last_timeout.lock().unwrap() = Some(connect_timeout);
        if let Some(message) = &self.open_error {
            return Err(DiagnosticError::Connection(message.clone()));
        }
        self.opens.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.session.clone()))
    }
}

/// Database check that only counts its invocations
pub struct CountingCheck {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait::async_trait]
impl Check<DbSession> for CountingCheck {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn label(&self) -> &'static str {
        "Counting"
    }

    async fn run(&self, _session: &DbSession) -> Result<Value, CheckError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "calls": self.calls.load(Ordering::SeqCst) }))
    }
}

/// Database check whose handler panics
pub struct PanickingCheck;

#[async_trait::async_trait]
impl Check<DbSession> for PanickingCheck {
    fn name(&self) -> &'static str {
        "explode"
    }

    fn label(&self) -> &'static str {
        "Explode"
    }

    async fn run(&self, _session: &DbSession) -> Result<Value, CheckError> {
        panic!("handler blew up");
    }
}

/// Transport returning scripted responses and recording what it was sent
#[derive(Default)]
pub struct MockForwardClient {
    responses: Mutex<BTreeMap<String, Result<RawResponse, String>>>,
    pub sent: Mutex<Vec<OutboundRequest>>,
}

impl MockForwardClient {
    pub fn respond(&self, url: &str, status: u16, headers: &[(&str, &str)], body: &str) {
        let headers = headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.responses.lock().unwrap().insert(
            url.to_string(),
            Ok(RawResponse {
                status_code: status,
                status_text: reason(status).to_string(),
                headers,
                body: body.as_bytes().to_vec(),
            }),
        );
    }

    pub fn fail(&self, url: &str, error: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), Err(error.to_string()));
    }

    pub fn last_sent(&self) -> Option<OutboundRequest> {
        self.sent.lock().unwrap().last().cloned()
    }
}

#[async_trait::async_trait]
impl ForwardClient for MockForwardClient {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, String> {
        let url = request.url.clone();
        self.sent.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .get(&url)
            .cloned()
            .unwrap_or_else(|| Err("URL not mocked".to_string()))
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "",
    }
}
