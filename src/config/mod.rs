//! Configuration loading, initialization, and validation
//!
//! Lives at `~/.devprobe/config.toml` unless `DEVPROBE_CONFIG` points
//! elsewhere. A missing file means defaults; a present but malformed file
//! is an error.

pub mod defaults;
pub mod types;

pub use defaults::DEFAULT_BIND;
pub use types::{Config, ConfigError, DatabaseConfig, HttpConfig, PresetsConfig, ServerConfig};

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_ENV_VAR: &str = "DEVPROBE_CONFIG";
pub const MAX_SAMPLE_LIMIT: u32 = 1000;

/// `~/.devprobe`, shared by config, presets, and the debug log
pub fn app_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_default().join(".devprobe")
}

impl Config {
    /// Config file location, honoring `DEVPROBE_CONFIG`
    pub fn path() -> PathBuf {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => app_dir().join("config.toml"),
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the default config, refusing to overwrite an existing file
    pub fn init() -> Result<PathBuf, ConfigError> {
        let path = Self::path();
        Self::default().init_at(&path)?;
        Ok(path)
    }

    pub fn init_at(&self, path: &Path) -> Result<(), ConfigError> {
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        self.save_to(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_error = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(write_error)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn print(&self) -> Result<(), ConfigError> {
        print!("{}", self.to_toml()?);
        Ok(())
    }

    /// Validate values that would otherwise fail later at runtime
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.database.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "database.connect_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if !(1..=MAX_SAMPLE_LIMIT).contains(&self.database.sample_limit) {
            return Err(ConfigError::Invalid(format!(
                "database.sample_limit must be between 1 and {}",
                MAX_SAMPLE_LIMIT
            )));
        }
        self.bind_addr()?;
        Ok(())
    }

    pub fn bind_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.server.bind.parse().map_err(|_| {
            ConfigError::Invalid(format!(
                "server.bind is not a valid socket address: {}",
                self.server.bind
            ))
        })
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.database.connect_timeout_ms)
    }

    pub fn presets_path(&self) -> PathBuf {
        self.presets
            .path
            .clone()
            .unwrap_or_else(|| app_dir().join("presets.json"))
    }
}
