//! Diagnostic run orchestration for the database facet
//!
//! A run validates its inputs, opens exactly one session, executes the
//! requested checks strictly in order, and closes the session before the
//! report is returned. If the session cannot be opened the run ends with a
//! single connection error and no results at all.

use crate::core::db::checks::{database_registry, DEFAULT_SAMPLE_LIMIT};
use crate::core::db::mongo::MongoConnector;
use crate::core::db::session::{Connector, DbSession};
use crate::core::debug_logger::DebugLogger;
use crate::core::registry::CheckRegistry;
use crate::core::report::DiagnosticReport;
use crate::core::types::DiagnosticError;
use std::sync::Arc;
use std::time::{Duration, Instant};

pub const CONNECTION_STRING_REQUIRED: &str = "Connection string is required";
pub const TESTS_REQUIRED: &str = "At least one test must be selected";

/// Default bound on session establishment
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5000;

/// Runs database check sequences, one session per run
pub struct TestRunner {
    connector: Arc<dyn Connector>,
    registry: Arc<CheckRegistry<DbSession>>,
    connect_timeout: Duration,
    logger: Arc<DebugLogger>,
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRunner {
    /// MongoDB connector, full catalog, 5s connect timeout
    pub fn new() -> Self {
        Self {
            connector: Arc::new(MongoConnector),
            registry: Arc::new(database_registry(DEFAULT_SAMPLE_LIMIT)),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            logger: Arc::new(DebugLogger::disabled()),
        }
    }

    /// Replace the connector (tests inject in-memory sessions here)
    pub fn with_connector(mut self, connector: Arc<dyn Connector>) -> Self {
        self.connector = connector;
        self
    }

    pub fn with_registry(mut self, registry: CheckRegistry<DbSession>) -> Self {
        self.registry = Arc::new(registry);
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_logger(mut self, logger: Arc<DebugLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn registry(&self) -> &CheckRegistry<DbSession> {
        &self.registry
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    /// Execute `checks` in order against one session opened from `connection_string`
    ///
    /// # Returns
    /// * `Ok(DiagnosticReport)` - one result per requested name, same order
    /// * `Err(DiagnosticError::Validation)` - empty connection string or check list;
    ///   nothing was opened
    /// * `Err(DiagnosticError::Connection)` - session could not be established;
    ///   no check ran
    ///
    /// Individual check failures never surface here. They are recorded in the
    /// report and the run continues with the next name.
    pub async fn run<S: AsRef<str>>(
        &self,
        connection_string: &str,
        checks: &[S],
    ) -> Result<DiagnosticReport, DiagnosticError> {
        validate(connection_string, checks)?;

        let correlation_id = DebugLogger::short_id();
        self.logger.run_start(checks.len(), &correlation_id);

        let run_started = Instant::now();
        let session = match self
            .connector
            .open(connection_string, self.connect_timeout)
            .await
        {
            Ok(session) => session,
            Err(error) => {
                self.logger
                    .session_open_failed(&error.to_string(), &correlation_id);
                return Err(error);
            }
        };
        self.logger.session_open(
            session.database_name(),
            run_started.elapsed().as_millis() as u64,
            &correlation_id,
        );

        // Handlers report failures as values and panics are caught per check,
        // so nothing in this loop can skip the close below
        let mut report = DiagnosticReport::with_capacity(checks.len());
        for name in checks {
            let name = name.as_ref();
            let started = Instant::now();
            let result = self.registry.dispatch(name, &*session).await;
            self.logger.check_end(
                name,
                result.success(),
                started.elapsed().as_millis() as u64,
                &correlation_id,
            );
            report.push(result);
        }

        session.close().await;
        self.logger.session_close(&correlation_id);
        self.logger.performance_sync(
            "TestRunner",
            "diagnostic_run",
            run_started.elapsed().as_millis() as u64,
        );

        Ok(report)
    }
}

/// Input validation shared by the server and the CLI
pub fn validate<S: AsRef<str>>(
    connection_string: &str,
    checks: &[S],
) -> Result<(), DiagnosticError> {
    if connection_string.trim().is_empty() {
        return Err(DiagnosticError::Validation(
            CONNECTION_STRING_REQUIRED.to_string(),
        ));
    }
    if checks.is_empty() {
        return Err(DiagnosticError::Validation(TESTS_REQUIRED.to_string()));
    }
    Ok(())
}
