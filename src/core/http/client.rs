//! Forwarding Client Implementations
//!
//! Transport abstraction for relaying one arbitrary HTTP request. Unlike a
//! health probe, the caller chooses method, headers, and body, and the full
//! response (status text, every header, body bytes) is handed back for
//! normalization.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use isahc::config::{Configurable, RedirectPolicy};
use isahc::{AsyncBody, AsyncReadResponseExt, HttpClient, Request};

/// Browser fetch follows at most 20 redirects
pub const MAX_REDIRECTS: u32 = 20;

/// Request as handed to the transport, already validated and normalized
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub url: String,
    /// Upper-case method name
    pub method: String,
    pub headers: BTreeMap<String, String>,
    /// Present only for methods that carry a body
    pub body: Option<Vec<u8>>,
}

/// Raw exchange result before body normalization
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    pub status_code: u16,
    pub status_text: String,
    /// Header names as produced by the transport; repeated headers joined by ", "
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

/// Outbound transport for the request forwarder
#[async_trait::async_trait]
pub trait ForwardClient: Send + Sync {
    /// Execute the request and read the complete response
    ///
    /// # Returns
    /// * `Ok(RawResponse)` - any HTTP status, including 4xx/5xx
    /// * `Err(String)` - the exchange could not complete (DNS, refused, reset)
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, String>;
}

/// Production client implementation using isahc
pub struct IsahcForwardClient {
    client: HttpClient,
}

impl IsahcForwardClient {
    pub fn new() -> Result<Self, String> {
        let client = HttpClient::builder()
            .redirect_policy(RedirectPolicy::Limit(MAX_REDIRECTS))
            .build()
            .map_err(|e| format!("Failed to create forwarding client: {}", e))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl ForwardClient for IsahcForwardClient {
    async fn send(&self, request: OutboundRequest) -> Result<RawResponse, String> {
        let mut builder = Request::builder()
            .method(request.method.as_str())
            .uri(request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let body = match request.body {
            Some(bytes) => AsyncBody::from(bytes),
            None => AsyncBody::empty(),
        };
        let outbound = builder
            .body(body)
            .map_err(|e| format!("Request creation failed: {}", e))?;

        let mut response = self
            .client
            .send_async(outbound)
            .await
            .map_err(|e| format!("Request failed: {}", e))?;

        let status = response.status();
        let headers = collect_headers(
            response
                .headers()
                .iter()
                .map(|(name, value)| (name.as_str(), String::from_utf8_lossy(value.as_bytes()))),
        );

        let body = response
            .bytes()
            .await
            .map_err(|e| format!("Failed to read response body: {}", e))?;

        Ok(RawResponse {
            status_code: status.as_u16(),
            // isahc does not expose the wire reason phrase
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
        })
    }
}

/// Fold header pairs into a map with unique keys, joining repeats with ", "
pub fn collect_headers<'a, I, V>(pairs: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (&'a str, V)>,
    V: AsRef<str>,
{
    let mut headers = BTreeMap::new();
    for (name, value) in pairs {
        match headers.entry(name.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value.as_ref().to_string());
            }
            Entry::Occupied(mut slot) => {
                let joined: &mut String = slot.get_mut();
                joined.push_str(", ");
                joined.push_str(value.as_ref());
            }
        }
    }
    headers
}
