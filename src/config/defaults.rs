use super::types::{Config, DatabaseConfig, HttpConfig, PresetsConfig, ServerConfig};
use crate::core::db::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_SAMPLE_LIMIT};
use crate::core::http::checks::DEFAULT_SLOW_THRESHOLD_MS;

pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            http: HttpConfig::default(),
            presets: PresetsConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            sample_limit: DEFAULT_SAMPLE_LIMIT,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            slow_threshold_ms: DEFAULT_SLOW_THRESHOLD_MS,
        }
    }
}
