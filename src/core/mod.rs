pub mod db;
pub mod debug_logger;
pub mod http;
pub mod registry;
pub mod report;
pub mod types;

pub use registry::{Check, CheckRegistry, UNKNOWN_CHECK};
pub use report::{CheckResult, DiagnosticReport};
pub use types::{CheckError, DiagnosticError};
