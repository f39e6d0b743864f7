//! Saved API presets
//!
//! A preset captures everything needed to re-run an API test: target,
//! method, body, expected status, headers, credentials, and the checks
//! to run.

pub mod store;

pub use store::{JsonPresetStore, MemoryPresetStore};

use crate::core::http::api_test::ApiTestRequest;
use crate::core::http::auth::AuthConfig;
use crate::core::http::checks::DEFAULT_EXPECTED_STATUS;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NAME_REQUIRED: &str = "Please enter an API name";
pub const URL_REQUIRED: &str = "Please enter an API URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedApi {
    /// Creation time in epoch milliseconds, unique within a store
    pub id: i64,
    pub name: String,
    pub url: String,
    pub method: String,
    #[serde(default)]
    pub request_body: String,
    pub expected_status: u16,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub checks: Vec<String>,
}

/// Fields supplied when saving a new preset; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewPreset {
    pub name: String,
    pub url: String,
    pub method: String,
    pub request_body: String,
    pub expected_status: u16,
    pub headers: BTreeMap<String, String>,
    pub auth: AuthConfig,
    pub checks: Vec<String>,
}

impl NewPreset {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: "GET".to_string(),
            request_body: String::new(),
            expected_status: DEFAULT_EXPECTED_STATUS,
            headers: BTreeMap::new(),
            auth: AuthConfig::None,
            checks: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<(), PresetError> {
        if self.name.trim().is_empty() {
            return Err(PresetError::Invalid(NAME_REQUIRED.to_string()));
        }
        if self.url.trim().is_empty() {
            return Err(PresetError::Invalid(URL_REQUIRED.to_string()));
        }
        Ok(())
    }

    pub fn into_saved(self, id: i64) -> SavedApi {
        SavedApi {
            id,
            name: self.name.trim().to_string(),
            url: self.url.trim().to_string(),
            method: self.method.trim().to_ascii_uppercase(),
            request_body: self.request_body.trim().to_string(),
            expected_status: self.expected_status,
            headers: self.headers,
            auth: self.auth,
            checks: self.checks,
        }
    }
}

impl SavedApi {
    pub fn to_request(&self) -> ApiTestRequest {
        ApiTestRequest {
            url: self.url.clone(),
            method: Some(self.method.clone()),
            headers: self.headers.clone(),
            body: Some(self.request_body.clone()).filter(|body| !body.is_empty()),
            auth: self.auth.clone(),
            expected_status: self.expected_status,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PresetError {
    #[error("{0}")]
    Invalid(String),
    #[error("Preset {0} not found")]
    NotFound(i64),
    #[error("Preset storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Preset file is corrupted: {0}")]
    Corrupted(#[from] serde_json::Error),
}

/// Persistence seam for saved presets
pub trait PresetRepository: Send + Sync {
    fn list(&self) -> Result<Vec<SavedApi>, PresetError>;

    fn get(&self, id: i64) -> Result<SavedApi, PresetError> {
        self.list()?
            .into_iter()
            .find(|preset| preset.id == id)
            .ok_or(PresetError::NotFound(id))
    }

    /// Validate, assign an id, and persist
    fn add(&self, preset: NewPreset) -> Result<SavedApi, PresetError>;

    fn remove(&self, id: i64) -> Result<SavedApi, PresetError>;
}

/// Millisecond timestamp id, bumped past any id already taken
pub(crate) fn next_id(existing: &[SavedApi]) -> i64 {
    let now = chrono::Utc::now().timestamp_millis();
    let highest = existing.iter().map(|preset| preset.id).max().unwrap_or(i64::MIN);
    now.max(highest.saturating_add(1))
}
