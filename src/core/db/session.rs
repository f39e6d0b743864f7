//! Database Session Abstraction
//!
//! A [`Session`] is one open connection scoped to a single diagnostic run.
//! The [`Connector`] opens it; the run that opened it is its only owner and
//! closes it by value, so a session cannot be closed twice or reused after
//! closing.

use crate::core::types::{CheckError, DiagnosticError};
use futures::future::BoxFuture;
use serde_json::Value;
use std::time::Duration;

/// One database visible to the connection
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseInfo {
    pub name: String,
    /// Size on disk in bytes
    pub size_on_disk: u64,
    pub empty: bool,
}

/// Administrative operations the check catalog needs from a live connection
///
/// Documents are exchanged as JSON values so checks stay independent of the
/// driver's document type.
#[async_trait::async_trait]
pub trait Session: Send + Sync {
    /// Database resolved from the connection string
    fn database_name(&self) -> &str;

    /// Administrative `ping` against the admin database
    async fn ping(&self) -> Result<(), CheckError>;

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, CheckError>;

    /// Collection names of the resolved database, in listing order
    async fn list_collection_names(&self) -> Result<Vec<String>, CheckError>;

    async fn count_documents(&self, collection: &str) -> Result<u64, CheckError>;

    /// Up to `limit` documents in storage order (no sort applied)
    async fn sample_documents(&self, collection: &str, limit: u32)
        -> Result<Vec<Value>, CheckError>;

    /// Raw index descriptors as reported by the server
    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, CheckError>;

    /// Raw `serverStatus` reply
    async fn server_status(&self) -> Result<Value, CheckError>;

    /// Raw `dbStats` reply for the resolved database
    async fn db_stats(&self) -> Result<Value, CheckError>;

    /// Release the underlying connection
    fn close(self: Box<Self>) -> BoxFuture<'static, ()>;
}

/// Check target for the database facet
pub type DbSession = dyn Session;

/// Opens sessions from caller-supplied connection strings
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    /// Open a session, bounded by `connect_timeout`
    ///
    /// # Errors
    ///
    /// Returns `DiagnosticError::Connection` when the string is malformed, names
    /// no default database, or the server cannot be reached in time.
    async fn open(
        &self,
        connection_string: &str,
        connect_timeout: Duration,
    ) -> Result<Box<dyn Session>, DiagnosticError>;
}
