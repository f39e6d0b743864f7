//! Request Forwarding
//!
//! Executes one arbitrary outbound request on the caller's behalf and
//! normalizes whatever comes back. Non-2xx statuses are ordinary responses;
//! only an exchange that cannot complete is an error.

use crate::core::debug_logger::DebugLogger;
use crate::core::http::client::{ForwardClient, IsahcForwardClient, OutboundRequest};
use crate::core::http::response::NormalizedResponse;
use crate::core::http::url::{display_url, is_body_method, normalize_method, parse_target};
use crate::core::types::DiagnosticError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

pub const URL_REQUIRED: &str = "URL is required";

/// Inbound forwarding request as posted by a caller
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForwardRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

impl ForwardRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }
}

/// Forwards requests through a pluggable transport
pub struct RequestForwarder {
    client: Arc<dyn ForwardClient>,
    logger: Arc<DebugLogger>,
}

impl RequestForwarder {
    /// Forwarder backed by the isahc transport
    pub fn new() -> Result<Self, DiagnosticError> {
        let client = IsahcForwardClient::new().map_err(DiagnosticError::Forwarding)?;
        Ok(Self::with_client(Arc::new(client)))
    }

    pub fn with_client(client: Arc<dyn ForwardClient>) -> Self {
        Self {
            client,
            logger: Arc::new(DebugLogger::disabled()),
        }
    }

    pub fn with_logger(mut self, logger: Arc<DebugLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Forward `request` and normalize the response
    ///
    /// # Returns
    /// * `Ok(NormalizedResponse)` - any status the target answered with
    /// * `Err(DiagnosticError::Validation)` - missing or empty `url`
    /// * `Err(DiagnosticError::Forwarding)` - unusable URL or failed exchange
    pub async fn forward(
        &self,
        request: &ForwardRequest,
    ) -> Result<NormalizedResponse, DiagnosticError> {
        let raw_url = match request.url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url,
            _ => return Err(DiagnosticError::Validation(URL_REQUIRED.to_string())),
        };
        let url = parse_target(raw_url).map_err(|e| DiagnosticError::Forwarding(e.to_string()))?;
        let method = normalize_method(request.method.as_deref());

        let body = match request.body.as_deref() {
            Some(body) if is_body_method(&method) && !body.is_empty() => {
                Some(body.as_bytes().to_vec())
            }
            _ => None,
        };

        let outbound = OutboundRequest {
            url: url.to_string(),
            method: method.clone(),
            headers: request.headers.clone().unwrap_or_default(),
            body,
        };
        let shown_url = display_url(&url);

        let started = Instant::now();
        let sent = self.client.send(outbound).await;
        let response_time = started.elapsed().as_millis() as u64;

        match sent {
            Ok(raw) => {
                self.logger
                    .forward_end(&method, &shown_url, Some(raw.status_code), response_time);
                Ok(NormalizedResponse::from_raw(raw, response_time))
            }
            Err(message) => {
                self.logger
                    .forward_end(&method, &shown_url, None, response_time);
                Err(DiagnosticError::Forwarding(message))
            }
        }
    }
}
