//! Check results and the ordered diagnostic report
//!
//! A [`CheckResult`] carries either a data payload or an error message, never
//! both. The constructors are the only way to build one, so the shape on the
//! wire is always `{test, success, data}` or `{test, success: false, error}`.

use serde::Serialize;
use serde_json::Value;

/// Outcome of one requested check
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    test: String,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl CheckResult {
    /// Successful check, reported under its human-readable label
    pub fn passed(label: impl Into<String>, data: Value) -> Self {
        Self {
            test: label.into(),
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed check, reported under the identifier exactly as requested
    pub fn failed(requested: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            test: requested.into(),
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }

    pub fn test(&self) -> &str {
        &self.test
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

/// Ordered per-check outcomes of one run
///
/// Order matches the requested check order exactly; duplicates are kept.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DiagnosticReport {
    results: Vec<CheckResult>,
}

impl DiagnosticReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            results: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Implicit overall status: true when every check succeeded
    pub fn all_passed(&self) -> bool {
        self.results.iter().all(CheckResult::success)
    }

    pub fn failures(&self) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(|result| !result.success())
    }

    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }
}
