// Core error types for diagnostic runs

/// Run-level failures. Any of these aborts a run before a report is produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagnosticError {
    /// Required input absent or empty; nothing was opened or executed
    #[error("{0}")]
    Validation(String),
    /// The database session could not be established
    #[error("{0}")]
    Connection(String),
    /// The outbound HTTP exchange could not be completed
    #[error("{0}")]
    Forwarding(String),
}

impl DiagnosticError {
    /// Remediation hint attached to server-side failures
    pub fn details(&self) -> Option<&'static str> {
        match self {
            DiagnosticError::Validation(_) => None,
            DiagnosticError::Connection(_) => {
                Some("Failed to connect to MongoDB. Please check your connection string.")
            }
            DiagnosticError::Forwarding(_) => {
                Some("Failed to fetch the URL. Please check if the URL is accessible.")
            }
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, DiagnosticError::Validation(_))
    }
}

/// Failure of a single check. Never escapes a run: the runner records it
/// as a failing result and moves on to the next check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckError {
    #[error("{0}")]
    Command(String),
    #[error("Reply is missing field '{0}'")]
    MissingField(String),
    #[error("Response body is not JSON")]
    NotStructured,
    #[error("{0}")]
    Assertion(String),
    #[error("Check panicked: {0}")]
    Panicked(String),
}

impl From<mongodb::error::Error> for CheckError {
    fn from(error: mongodb::error::Error) -> Self {
        CheckError::Command(error.to_string())
    }
}

impl From<mongodb::bson::document::ValueAccessError> for CheckError {
    fn from(error: mongodb::bson::document::ValueAccessError) -> Self {
        CheckError::Command(error.to_string())
    }
}
