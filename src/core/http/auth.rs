use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_API_KEY_HEADER: &str = "X-API-Key";

/// Credentials attached to a tested request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum AuthConfig {
    #[default]
    None,
    Bearer {
        token: String,
    },
    Basic {
        username: String,
        password: String,
    },
    #[serde(rename = "apikey")]
    ApiKey {
        #[serde(default = "default_api_key_header")]
        header: String,
        value: String,
    },
}

fn default_api_key_header() -> String {
    DEFAULT_API_KEY_HEADER.to_string()
}

impl AuthConfig {
    pub fn bearer(token: impl Into<String>) -> Self {
        AuthConfig::Bearer {
            token: token.into(),
        }
    }

    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn api_key(header: Option<String>, value: impl Into<String>) -> Self {
        AuthConfig::ApiKey {
            header: header
                .filter(|h| !h.trim().is_empty())
                .unwrap_or_else(default_api_key_header),
            value: value.into(),
        }
    }

    /// Add this config's header to `headers`
    ///
    /// Blank credentials add nothing; basic auth needs both halves.
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            AuthConfig::None => {}
            AuthConfig::Bearer { token } => {
                if !token.is_empty() {
                    headers.insert("Authorization".to_string(), format!("Bearer {}", token));
                }
            }
            AuthConfig::Basic { username, password } => {
                if !username.is_empty() && !password.is_empty() {
                    let encoded = STANDARD.encode(format!("{}:{}", username, password));
                    headers.insert("Authorization".to_string(), format!("Basic {}", encoded));
                }
            }
            AuthConfig::ApiKey { header, value } => {
                if !value.is_empty() {
                    let name = if header.is_empty() {
                        DEFAULT_API_KEY_HEADER
                    } else {
                        header.as_str()
                    };
                    headers.insert(name.to_string(), value.clone());
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            AuthConfig::None => "none",
            AuthConfig::Bearer { .. } => "bearer",
            AuthConfig::Basic { .. } => "basic",
            AuthConfig::ApiKey { .. } => "apikey",
        }
    }
}
