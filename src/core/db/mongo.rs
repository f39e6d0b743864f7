//! MongoDB implementation of the session seam

use crate::core::db::checks::SAMPLE_LIMIT_ZERO;
use crate::core::db::session::{Connector, DatabaseInfo, Session};
use crate::core::types::{CheckError, DiagnosticError};
use futures::future::BoxFuture;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Database};
use serde_json::Value;
use std::time::Duration;

/// Production connector backed by the official driver
#[derive(Debug, Default, Clone, Copy)]
pub struct MongoConnector;

#[async_trait::async_trait]
impl Connector for MongoConnector {
    async fn open(
        &self,
        connection_string: &str,
        connect_timeout: Duration,
    ) -> Result<Box<dyn Session>, DiagnosticError> {
        let mut options = ClientOptions::parse(connection_string)
            .await
            .map_err(connection_error)?;

        // Bounds both server selection and the socket connect
        options.server_selection_timeout = Some(connect_timeout);
        options.connect_timeout = Some(connect_timeout);

        let database_name = options.default_database.clone().ok_or_else(|| {
            DiagnosticError::Connection(
                "No default database name found in connection string".to_string(),
            )
        })?;

        let client = Client::with_options(options).map_err(connection_error)?;

        // The driver connects lazily; force the handshake so failures surface here
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(connection_error)?;

        Ok(Box::new(MongoSession {
            client,
            database_name,
        }))
    }
}

fn connection_error(error: mongodb::error::Error) -> DiagnosticError {
    DiagnosticError::Connection(error.to_string())
}

/// Live driver client plus the resolved default database
pub struct MongoSession {
    client: Client,
    database_name: String,
}

impl MongoSession {
    fn database(&self) -> Database {
        self.client.database(&self.database_name)
    }
}

/// Relaxed extended JSON, the same shape drivers print for documents
fn to_json(document: Document) -> Value {
    Bson::Document(document).into_relaxed_extjson()
}

#[async_trait::async_trait]
impl Session for MongoSession {
    fn database_name(&self) -> &str {
        &self.database_name
    }

    async fn ping(&self) -> Result<(), CheckError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }

    async fn list_databases(&self) -> Result<Vec<DatabaseInfo>, CheckError> {
        let databases = self.client.list_databases().await?;
        Ok(databases
            .into_iter()
            .map(|db| DatabaseInfo {
                name: db.name,
                size_on_disk: db.size_on_disk,
                empty: db.empty,
            })
            .collect())
    }

    async fn list_collection_names(&self) -> Result<Vec<String>, CheckError> {
        Ok(self.database().list_collection_names().await?)
    }

    async fn count_documents(&self, collection: &str) -> Result<u64, CheckError> {
        Ok(self
            .database()
            .collection::<Document>(collection)
            .count_documents(doc! {})
            .await?)
    }

    async fn sample_documents(
        &self,
        collection: &str,
        limit: u32,
    ) -> Result<Vec<Value>, CheckError> {
        if limit == 0 {
            return Err(CheckError::Assertion(SAMPLE_LIMIT_ZERO.to_string()));
        }
        let cursor = self
            .database()
            .collection::<Document>(collection)
            .find(doc! {})
            .limit(i64::from(limit))
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents.into_iter().map(to_json).collect())
    }

    async fn list_indexes(&self, collection: &str) -> Result<Vec<Value>, CheckError> {
        // Raw command keeps the server's descriptors (v, key, name, options) intact
        let reply = self
            .database()
            .run_command(doc! { "listIndexes": collection })
            .await?;
        let batch = reply.get_document("cursor")?.get_array("firstBatch")?;
        Ok(batch
            .iter()
            .map(|index| index.clone().into_relaxed_extjson())
            .collect())
    }

    async fn server_status(&self) -> Result<Value, CheckError> {
        let reply = self
            .client
            .database("admin")
            .run_command(doc! { "serverStatus": 1 })
            .await?;
        Ok(to_json(reply))
    }

    async fn db_stats(&self) -> Result<Value, CheckError> {
        let reply = self.database().run_command(doc! { "dbStats": 1 }).await?;
        Ok(to_json(reply))
    }

    fn close(self: Box<Self>) -> BoxFuture<'static, ()> {
        Box::pin(async move {
            self.client.shutdown().await;
        })
    }
}
