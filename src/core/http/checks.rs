//! HTTP Check Catalog
//!
//! Handlers over an already forwarded response. They never touch the
//! network, so the aggregation engine is the same one the database facet
//! uses and a single forward serves any number of checks.

use crate::core::http::parsing::json_structure;
use crate::core::http::response::NormalizedResponse;
use crate::core::registry::{Check, CheckRegistry};
use crate::core::types::CheckError;
use serde_json::{json, Value};

pub const DEFAULT_EXPECTED_STATUS: u16 = 200;
pub const DEFAULT_SLOW_THRESHOLD_MS: u64 = 1000;

/// Target of the HTTP checks: one response plus the caller's expectations
#[derive(Debug, Clone)]
pub struct ApiProbe {
    pub response: NormalizedResponse,
    pub expected_status: u16,
    pub slow_threshold_ms: u64,
}

impl ApiProbe {
    pub fn new(response: NormalizedResponse) -> Self {
        Self {
            response,
            expected_status: DEFAULT_EXPECTED_STATUS,
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }
}

/// Registry with the complete HTTP catalog
pub fn api_registry() -> CheckRegistry<ApiProbe> {
    CheckRegistry::new()
        .with(StatusCodeCheck)
        .with(ResponseTimeCheck)
        .with(HeadersCheck)
        .with(ContentTypeCheck)
        .with(BodyCheck)
        .with(JsonStructureCheck)
}

pub struct StatusCodeCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for StatusCodeCheck {
    fn name(&self) -> &'static str {
        "status-code"
    }

    fn label(&self) -> &'static str {
        "Status Code"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        let status = probe.response.status;
        if status != probe.expected_status {
            return Err(CheckError::Assertion(format!(
                "Expected status {}, got {}",
                probe.expected_status, status
            )));
        }
        Ok(json!({
            "status": status,
            "expected": probe.expected_status,
        }))
    }
}

pub struct ResponseTimeCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for ResponseTimeCheck {
    fn name(&self) -> &'static str {
        "response-time"
    }

    fn label(&self) -> &'static str {
        "Response Time"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        let elapsed = probe.response.response_time;
        Ok(json!({
            "responseTime": elapsed,
            "slow": elapsed >= probe.slow_threshold_ms,
        }))
    }
}

pub struct HeadersCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for HeadersCheck {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn label(&self) -> &'static str {
        "Response Headers"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        Ok(json!({ "headers": probe.response.headers }))
    }
}

pub struct ContentTypeCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for ContentTypeCheck {
    fn name(&self) -> &'static str {
        "content-type"
    }

    fn label(&self) -> &'static str {
        "Content-Type"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        Ok(json!({ "contentType": probe.response.content_type() }))
    }
}

pub struct BodyCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for BodyCheck {
    fn name(&self) -> &'static str {
        "body"
    }

    fn label(&self) -> &'static str {
        "Response Body"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        Ok(json!({ "body": probe.response.body }))
    }
}

pub struct JsonStructureCheck;

#[async_trait::async_trait]
impl Check<ApiProbe> for JsonStructureCheck {
    fn name(&self) -> &'static str {
        "json-structure"
    }

    fn label(&self) -> &'static str {
        "JSON Structure"
    }

    async fn run(&self, probe: &ApiProbe) -> Result<Value, CheckError> {
        // Only objects and arrays have a structure; null counts as an object
        match probe.response.body.as_json() {
            Some(value @ (Value::Object(_) | Value::Array(_) | Value::Null)) => {
                Ok(json_structure(value, 0))
            }
            _ => Err(CheckError::NotStructured),
        }
    }
}
