//! URL and Method Utilities for Request Forwarding

use url::Url;

/// Methods whose requests carry a body when one is supplied
pub const BODY_METHODS: [&str; 3] = ["POST", "PUT", "PATCH"];

pub const DEFAULT_METHOD: &str = "GET";

#[derive(Debug, thiserror::Error)]
pub enum UrlError {
    #[error("Invalid URL: {0}")]
    ParseError(#[from] url::ParseError),
    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
    #[error("Missing host in URL")]
    MissingHost,
}

/// Parse a forwarding target, accepting only absolute http(s) URLs
///
/// # Examples
/// - `https://api.example.com/users` → Ok
/// - `ftp://files.example.com` → `UnsupportedScheme`
/// - `/relative/path` → `ParseError`
pub fn parse_target(raw: &str) -> Result<Url, UrlError> {
    let url = Url::parse(raw.trim())?;

    match url.scheme() {
        "http" | "https" => {}
        other => return Err(UrlError::UnsupportedScheme(other.to_string())),
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    Ok(url)
}

/// Upper-cased method, `GET` when absent or blank
pub fn normalize_method(method: Option<&str>) -> String {
    match method.map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_uppercase(),
        _ => DEFAULT_METHOD.to_string(),
    }
}

/// Whether `method` (already normalized) may carry a request body
pub fn is_body_method(method: &str) -> bool {
    BODY_METHODS.contains(&method)
}

/// URL safe for logs: userinfo password removed
pub fn display_url(url: &Url) -> String {
    let mut shown = url.clone();
    if shown.password().is_some() {
        let _ = shown.set_password(Some("[REDACTED]"));
    }
    shown.to_string()
}
