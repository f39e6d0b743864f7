//! Database facet: session seam, check catalog, and run orchestration

pub mod checks;
pub mod format;
pub mod mongo;
pub mod runner;
pub mod session;

pub use checks::{database_registry, DEFAULT_SAMPLE_LIMIT};
pub use mongo::{MongoConnector, MongoSession};
pub use runner::{TestRunner, DEFAULT_CONNECT_TIMEOUT_MS};
pub use session::{Connector, DatabaseInfo, DbSession, Session};
