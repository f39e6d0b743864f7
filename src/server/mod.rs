//! HTTP surface over the diagnostic core
//!
//! Two POST endpoints, each also served under its original `/api` path:
//!
//! - `/proxy` (`/api/proxy`) forwards one request and returns the
//!   normalized response
//! - `/diagnostic-run` (`/api/mongodb-test`) runs database checks and
//!   returns `{results}`
//!
//! Every response carries permissive CORS headers and `OPTIONS` answers
//! 200 with an empty body. Bodies are parsed regardless of content type.

use crate::config::{Config, ConfigError};
use crate::core::db::TestRunner;
use crate::core::debug_logger::DebugLogger;
use crate::core::http::{ForwardRequest, RequestForwarder};
use crate::core::types::DiagnosticError;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{post, MethodRouter};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;

pub const INVALID_JSON_BODY: &str = "Invalid JSON body";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub runner: Arc<TestRunner>,
    pub forwarder: Arc<RequestForwarder>,
    pub logger: Arc<DebugLogger>,
}

impl AppState {
    pub fn new(runner: TestRunner, forwarder: RequestForwarder) -> Self {
        Self {
            runner: Arc::new(runner),
            forwarder: Arc::new(forwarder),
            logger: Arc::new(DebugLogger::disabled()),
        }
    }

    pub fn with_logger(mut self, logger: Arc<DebugLogger>) -> Self {
        self.logger = logger;
        self
    }
}

/// Body of `POST /diagnostic-run`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticRunRequest {
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub tests: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'static str>,
}

/// Everything a handler can answer with besides success
#[derive(Debug)]
pub enum ApiError {
    Diagnostic(DiagnosticError),
    InvalidJson,
    MethodNotAllowed,
    NotFound,
}

impl From<DiagnosticError> for ApiError {
    fn from(error: DiagnosticError) -> Self {
        ApiError::Diagnostic(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Diagnostic(error) => {
                let status = if error.is_validation() {
                    StatusCode::BAD_REQUEST
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (
                    status,
                    ErrorBody {
                        error: error.to_string(),
                        details: error.details(),
                    },
                )
            }
            ApiError::InvalidJson => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: INVALID_JSON_BODY.to_string(),
                    details: None,
                },
            ),
            ApiError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                ErrorBody {
                    error: METHOD_NOT_ALLOWED.to_string(),
                    details: None,
                },
            ),
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Not found".to_string(),
                    details: None,
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/proxy", endpoint(post(proxy)))
        .route("/api/proxy", endpoint(post(proxy)))
        .route("/diagnostic-run", endpoint(post(diagnostic_run)))
        .route("/api/mongodb-test", endpoint(post(diagnostic_run)))
        .fallback(not_found)
        .with_state(state)
        .layer(axum::middleware::map_response(with_cors_headers))
}

fn endpoint(method_router: MethodRouter<AppState>) -> MethodRouter<AppState> {
    method_router.options(preflight).fallback(method_not_allowed)
}

async fn proxy(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: ForwardRequest = parse_json(&body)?;
    match state.forwarder.forward(&request).await {
        Ok(response) => Ok(Json(response).into_response()),
        Err(error) => {
            state
                .logger
                .error_sync("server", "proxy_failed", &error.to_string());
            Err(error.into())
        }
    }
}

async fn diagnostic_run(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let request: DiagnosticRunRequest = parse_json(&body)?;
    let connection_string = request.connection_string.unwrap_or_default();
    let tests = request.tests.unwrap_or_default();

    match state.runner.run(&connection_string, &tests).await {
        Ok(report) => Ok(Json(json!({ "results": report.results() })).into_response()),
        Err(error) => {
            state
                .logger
                .error_sync("server", "diagnostic_run_failed", &error.to_string());
            Err(error.into())
        }
    }
}

async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

async fn with_cors_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("Content-Type"),
    );
    response
}

fn parse_json<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|_| ApiError::InvalidJson)
}

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Diagnostic(#[from] DiagnosticError),
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
    #[error("Server failed: {0}")]
    Serve(std::io::Error),
}

/// Build state from `config` and serve until the process is stopped
pub async fn serve(config: &Config, logger: Arc<DebugLogger>) -> Result<(), ServerError> {
    let addr = config.bind_addr()?;

    let runner = TestRunner::new()
        .with_registry(crate::core::db::database_registry(config.database.sample_limit))
        .with_connect_timeout(config.connect_timeout())
        .with_logger(logger.clone());
    let forwarder = RequestForwarder::new()?.with_logger(logger.clone());
    let state = AppState::new(runner, forwarder).with_logger(logger.clone());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    logger.server_start(&addr.to_string());
    println!("devprobe listening on http://{}", addr);

    axum::serve(listener, router(state))
        .await
        .map_err(ServerError::Serve)
}
