//! Check Registry and Aggregation Engine
//!
//! A registry maps a check name to a handler over some target type. The
//! database facet registers handlers over a `dyn Session`, the HTTP facet
//! over a forwarded response. Both aggregate through [`CheckRegistry::run_all`]
//! and [`CheckRegistry::dispatch`], so failure isolation behaves identically:
//!
//! - A handler error becomes a failing result and the next check still runs
//! - A panicking handler is caught and reported the same way
//! - A name the registry does not know is its natural miss case and yields
//!   `Unknown test type` at the requested position

use crate::core::report::{CheckResult, DiagnosticReport};
use crate::core::types::CheckError;
use futures::FutureExt;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

/// Error message recorded for names absent from the registry
pub const UNKNOWN_CHECK: &str = "Unknown test type";

/// A named, stateless unit of inspection over a target
#[async_trait::async_trait]
pub trait Check<T: ?Sized + Sync>: Send + Sync {
    /// Identifier used in requests (e.g. `list-databases`)
    fn name(&self) -> &'static str;

    /// Human-readable label reported for successful runs (e.g. `List Databases`)
    fn label(&self) -> &'static str;

    /// Execute against the target and produce the structured payload
    async fn run(&self, target: &T) -> Result<Value, CheckError>;
}

/// Catalog of checks keyed by name, remembering registration order
pub struct CheckRegistry<T: ?Sized + Sync> {
    checks: HashMap<&'static str, Arc<dyn Check<T>>>,
    order: Vec<&'static str>,
}

impl<T: ?Sized + Sync> Default for CheckRegistry<T> {
    fn default() -> Self {
        Self {
            checks: HashMap::new(),
            order: Vec::new(),
        }
    }
}

impl<T: ?Sized + Sync> CheckRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a check. A check registered under an existing name replaces it.
    pub fn register<C>(&mut self, check: C) -> &mut Self
    where
        C: Check<T> + 'static,
    {
        let name = check.name();
        if self.checks.insert(name, Arc::new(check)).is_none() {
            self.order.push(name);
        }
        self
    }

    /// Builder form of [`CheckRegistry::register`]
    pub fn with<C>(mut self, check: C) -> Self
    where
        C: Check<T> + 'static,
    {
        self.register(check);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Check<T>>> {
        self.checks.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.checks.contains_key(name)
    }

    /// Registered names in registration order
    pub fn names(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run one requested check and convert its outcome into a result
    pub async fn dispatch(&self, requested: &str, target: &T) -> CheckResult {
        let Some(check) = self.get(requested) else {
            return CheckResult::failed(requested, UNKNOWN_CHECK);
        };

        match AssertUnwindSafe(check.run(target)).catch_unwind().await {
            Ok(Ok(data)) => CheckResult::passed(check.label(), data),
            Ok(Err(error)) => CheckResult::failed(requested, error.to_string()),
            Err(payload) => CheckResult::failed(
                requested,
                CheckError::Panicked(panic_message(payload.as_ref())).to_string(),
            ),
        }
    }

    /// Run every requested name strictly in order against one target
    pub async fn run_all<S: AsRef<str>>(&self, target: &T, requested: &[S]) -> DiagnosticReport {
        let mut report = DiagnosticReport::with_capacity(requested.len());
        for name in requested {
            report.push(self.dispatch(name.as_ref(), target).await);
        }
        report
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
