//! HTTP facet: request forwarding, response normalization, and API checks

pub mod auth;
pub mod checks;
pub mod client;
pub mod forwarder;
pub mod parsing;
pub mod response;
pub mod url;

pub use api_test::{prepare_request, run_api_test, ApiTestReport, ApiTestRequest, ApiTester};
pub use auth::AuthConfig;
pub use checks::{api_registry, ApiProbe};
pub use client::{ForwardClient, IsahcForwardClient, OutboundRequest, RawResponse};
pub use forwarder::{ForwardRequest, RequestForwarder};
pub use parsing::ResponseBody;
pub use response::NormalizedResponse;
