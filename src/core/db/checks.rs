//! Database Check Catalog
//!
//! Every entry is a stateless handler over a [`DbSession`]. Per-collection
//! checks walk collections sequentially in listing order because they all
//! share the run's single connection.

use crate::core::db::format::{kilobytes, megabytes, uptime_hours, with_mb_suffix};
use crate::core::db::session::DbSession;
use crate::core::registry::{Check, CheckRegistry};
use crate::core::types::CheckError;
use serde_json::{json, Map, Number, Value};

/// Default number of documents fetched per collection by `sample-documents`
pub const DEFAULT_SAMPLE_LIMIT: u32 = 5;

/// A zero limit means "no limit" to the server, so it is refused before any read
pub const SAMPLE_LIMIT_ZERO: &str = "Sample limit must be at least 1";

/// Registry with the complete database catalog
pub fn database_registry(sample_limit: u32) -> CheckRegistry<DbSession> {
    CheckRegistry::new()
        .with(ConnectionCheck)
        .with(ListDatabasesCheck)
        .with(ListCollectionsCheck)
        .with(CountDocumentsCheck)
        .with(SampleDocumentsCheck {
            limit: sample_limit,
        })
        .with(IndexesCheck)
        .with(ServerStatusCheck)
        .with(DbStatsCheck)
}

pub struct ConnectionCheck;

#[async_trait::async_trait]
impl Check<DbSession> for ConnectionCheck {
    fn name(&self) -> &'static str {
        "connection"
    }

    fn label(&self) -> &'static str {
        "Connection Test"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        session.ping().await?;
        Ok(json!({
            "status": "Connected successfully",
            "database": session.database_name(),
        }))
    }
}

pub struct ListDatabasesCheck;

#[async_trait::async_trait]
impl Check<DbSession> for ListDatabasesCheck {
    fn name(&self) -> &'static str {
        "list-databases"
    }

    fn label(&self) -> &'static str {
        "List Databases"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let databases = session.list_databases().await?;
        let entries: Vec<Value> = databases
            .iter()
            .map(|db| {
                json!({
                    "name": db.name,
                    "sizeOnDisk": megabytes(db.size_on_disk as f64),
                    "empty": db.empty,
                })
            })
            .collect();

        Ok(json!({
            "count": entries.len(),
            "databases": entries,
        }))
    }
}

pub struct ListCollectionsCheck;

#[async_trait::async_trait]
impl Check<DbSession> for ListCollectionsCheck {
    fn name(&self) -> &'static str {
        "list-collections"
    }

    fn label(&self) -> &'static str {
        "List Collections"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let collections = session.list_collection_names().await?;
        Ok(json!({
            "database": session.database_name(),
            "count": collections.len(),
            "collections": collections,
        }))
    }
}

pub struct CountDocumentsCheck;

#[async_trait::async_trait]
impl Check<DbSession> for CountDocumentsCheck {
    fn name(&self) -> &'static str {
        "count-documents"
    }

    fn label(&self) -> &'static str {
        "Count Documents"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let mut counts = Map::new();
        let mut total: u64 = 0;
        for collection in session.list_collection_names().await? {
            let count = session.count_documents(&collection).await?;
            total += count;
            counts.insert(collection, Value::from(count));
        }

        Ok(json!({
            "database": session.database_name(),
            "documentCounts": counts,
            "totalDocuments": total,
        }))
    }
}

pub struct SampleDocumentsCheck {
    pub limit: u32,
}

impl Default for SampleDocumentsCheck {
    fn default() -> Self {
        Self {
            limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

#[async_trait::async_trait]
impl Check<DbSession> for SampleDocumentsCheck {
    fn name(&self) -> &'static str {
        "sample-documents"
    }

    fn label(&self) -> &'static str {
        "Sample Documents"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        if self.limit == 0 {
            return Err(CheckError::Assertion(SAMPLE_LIMIT_ZERO.to_string()));
        }

        let mut samples = Map::new();
        for collection in session.list_collection_names().await? {
            let documents = session.sample_documents(&collection, self.limit).await?;
            samples.insert(collection, Value::Array(documents));
        }

        Ok(json!({
            "database": session.database_name(),
            "samples": samples,
        }))
    }
}

pub struct IndexesCheck;

#[async_trait::async_trait]
impl Check<DbSession> for IndexesCheck {
    fn name(&self) -> &'static str {
        "indexes"
    }

    fn label(&self) -> &'static str {
        "List Indexes"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let mut indexes = Map::new();
        for collection in session.list_collection_names().await? {
            let descriptors = session.list_indexes(&collection).await?;
            indexes.insert(collection, Value::Array(descriptors));
        }

        Ok(json!({
            "database": session.database_name(),
            "indexes": indexes,
        }))
    }
}

pub struct ServerStatusCheck;

#[async_trait::async_trait]
impl Check<DbSession> for ServerStatusCheck {
    fn name(&self) -> &'static str {
        "server-status"
    }

    fn label(&self) -> &'static str {
        "Server Status"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let status = session.server_status().await?;

        Ok(json!({
            "version": field(&status, "version")?,
            "uptime": uptime_hours(float(&status, "uptime")?),
            "connections": field(&status, "connections")?,
            "network": {
                "bytesIn": megabytes(float(&status, "network.bytesIn")?),
                "bytesOut": megabytes(float(&status, "network.bytesOut")?),
                "numRequests": field(&status, "network.numRequests")?,
            },
            "memory": {
                "resident": with_mb_suffix(number(&status, "mem.resident")?),
                "virtual": with_mb_suffix(number(&status, "mem.virtual")?),
            },
        }))
    }
}

pub struct DbStatsCheck;

#[async_trait::async_trait]
impl Check<DbSession> for DbStatsCheck {
    fn name(&self) -> &'static str {
        "db-stats"
    }

    fn label(&self) -> &'static str {
        "Database Stats"
    }

    async fn run(&self, session: &DbSession) -> Result<Value, CheckError> {
        let stats = session.db_stats().await?;

        Ok(json!({
            "database": session.database_name(),
            "collections": passthrough(&stats, "collections"),
            "views": passthrough(&stats, "views"),
            "objects": passthrough(&stats, "objects"),
            "avgObjSize": kilobytes(float(&stats, "avgObjSize")?),
            "dataSize": megabytes(float(&stats, "dataSize")?),
            "storageSize": megabytes(float(&stats, "storageSize")?),
            "indexes": passthrough(&stats, "indexes"),
            "indexSize": megabytes(float(&stats, "indexSize")?),
        }))
    }
}

/// Resolve a dotted path inside a command reply
fn field<'a>(reply: &'a Value, path: &str) -> Result<&'a Value, CheckError> {
    path.split('.')
        .try_fold(reply, |value, key| value.get(key))
        .ok_or_else(|| CheckError::MissingField(path.to_string()))
}

fn number<'a>(reply: &'a Value, path: &str) -> Result<&'a Number, CheckError> {
    match field(reply, path)? {
        Value::Number(number) => Ok(number),
        _ => Err(CheckError::MissingField(path.to_string())),
    }
}

fn float(reply: &Value, path: &str) -> Result<f64, CheckError> {
    number(reply, path)?
        .as_f64()
        .ok_or_else(|| CheckError::MissingField(path.to_string()))
}

/// Counters that older servers omit are reported as null rather than failing
fn passthrough(reply: &Value, key: &str) -> Value {
    reply.get(key).cloned().unwrap_or(Value::Null)
}
