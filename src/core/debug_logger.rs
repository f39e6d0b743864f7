use std::collections::HashMap;
use std::env;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Local;
use flate2::{write::GzEncoder, Compression};
use fs2::FileExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Hardcoded rotation policy - only the on/off switch comes from the environment
const LOG_ROTATION_SIZE_MB: u64 = 8;
const MAX_ARCHIVES: u32 = 5;
const ROTATION_CHECK_INTERVAL: u32 = 200;

pub const DEBUG_ENV_VAR: &str = "DEVPROBE_DEBUG";

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct LogEntry {
    pub timestamp: String,                          // ISO-8601 with timezone
    pub level: String,                              // DEBUG, ERROR, PERF, RUN, HTTP
    pub component: String,                          // Component name
    pub event: String,                              // Event type
    pub message: String,                            // Human readable message (redacted)
    pub correlation_id: Option<String>,             // Ties together one diagnostic run
    pub fields: HashMap<String, serde_json::Value>, // Structured data
}

struct RotatingLogger {
    log_path: PathBuf,
    write_count: AtomicU32,
}

impl RotatingLogger {
    fn new(log_path: PathBuf) -> Self {
        if let Some(parent) = log_path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }

        Self {
            log_path,
            write_count: AtomicU32::new(0),
        }
    }

    fn write_with_rotation(&self, json_line: &str) -> Result<(), std::io::Error> {
        if self.write_count.fetch_add(1, Ordering::Relaxed) % ROTATION_CHECK_INTERVAL == 0 {
            let _ = self.rotate_if_needed(); // Rotation failure must not stop logging
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        writeln!(file, "{}", json_line)?;
        Ok(())
    }

    fn rotate_if_needed(&self) -> Result<(), std::io::Error> {
        if !self.needs_rotation()? {
            return Ok(());
        }

        // Another process may share the log file
        let lock_path = self.log_path.with_extension("lock");
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        match lock_file.try_lock_exclusive() {
            Ok(()) => {
                if self.needs_rotation()? {
                    self.perform_rotation()?;
                }
                let _ = std::fs::remove_file(&lock_path);
                Ok(())
            }
            Err(_) => Ok(()), // Someone else is rotating
        }
    }

    fn needs_rotation(&self) -> Result<bool, std::io::Error> {
        if !self.log_path.exists() {
            return Ok(false);
        }

        let metadata = std::fs::metadata(&self.log_path)?;
        Ok(metadata.len() >= LOG_ROTATION_SIZE_MB * 1024 * 1024)
    }

    fn log_dir_and_stem(&self) -> Result<(&Path, String), std::io::Error> {
        let dir = self.log_path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no parent")
        })?;
        let stem = self
            .log_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .ok_or_else(|| {
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "log path has no file name")
            })?;
        Ok((dir, stem))
    }

    fn perform_rotation(&self) -> Result<(), std::io::Error> {
        let (log_dir, base_name) = self.log_dir_and_stem()?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let archive_path = log_dir.join(format!("{}.{}.gz", base_name, timestamp));

        // Move aside first so writers immediately start a fresh file
        let temp_path = self.log_path.with_extension("rotating");
        std::fs::rename(&self.log_path, &temp_path)?;

        let source_file = File::open(&temp_path)?;
        let target_file = File::create(&archive_path)?;
        let mut encoder = GzEncoder::new(target_file, Compression::default());
        std::io::copy(&mut BufReader::new(source_file), &mut encoder)?;
        encoder.finish()?;

        std::fs::remove_file(&temp_path)?;

        let _ = self.cleanup_old_archives();

        Ok(())
    }

    fn cleanup_old_archives(&self) -> Result<(), std::io::Error> {
        let (log_dir, base_name) = self.log_dir_and_stem()?;
        let prefix = format!("{}.", base_name);

        let mut archives = Vec::new();
        for entry in std::fs::read_dir(log_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();

            if name.starts_with(&prefix) && name.ends_with(".gz") {
                archives.push((entry.path(), entry.metadata()?.modified()?));
            }
        }

        // Keep only the most recent MAX_ARCHIVES
        archives.sort_by_key(|(_, modified)| *modified);
        if archives.len() > MAX_ARCHIVES as usize {
            let to_remove = archives.len() - MAX_ARCHIVES as usize;
            for (path, _) in archives.iter().take(to_remove) {
                let _ = std::fs::remove_file(path);
            }
        }

        Ok(())
    }
}

/// JSON-lines debug logger with rotation and secret redaction
///
/// Disabled unless `DEVPROBE_DEBUG` is truthy or a path is given explicitly.
/// Connection strings pass through here constantly, so every message is run
/// through the redaction patterns before it reaches disk.
pub struct DebugLogger {
    enabled: bool,
    rotating_logger: Option<Arc<Mutex<RotatingLogger>>>,
    session_id: String, // Default correlation ID for this logger
    redaction_patterns: Vec<(Regex, &'static str)>,
}

impl Default for DebugLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl DebugLogger {
    pub fn new() -> Self {
        if Self::parse_debug_enabled() {
            Self::with_path(Self::default_log_path())
        } else {
            Self::disabled()
        }
    }

    /// Logger writing to `log_path` regardless of the environment
    pub fn with_path(log_path: PathBuf) -> Self {
        Self {
            enabled: true,
            rotating_logger: Some(Arc::new(Mutex::new(RotatingLogger::new(log_path)))),
            session_id: Self::short_id(),
            redaction_patterns: Self::compile_redaction_patterns(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            rotating_logger: None,
            session_id: Self::short_id(),
            redaction_patterns: Self::compile_redaction_patterns(),
        }
    }

    /// Short random identifier, also used to correlate the events of one run
    pub fn short_id() -> String {
        Uuid::new_v4().to_string()[..8].to_string()
    }

    /// Supports: true/false, 1/0, yes/no, on/off (case insensitive)
    fn parse_debug_enabled() -> bool {
        env::var(DEBUG_ENV_VAR)
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
            .unwrap_or(false)
    }

    pub fn default_log_path() -> PathBuf {
        let mut log_path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        log_path.push(".devprobe");
        log_path.push("devprobe-debug.log");
        log_path
    }

    fn compile_redaction_patterns() -> Vec<(Regex, &'static str)> {
        let patterns = [
            // Credentials embedded in database URIs keep the scheme and host visible
            (r"(?i)(mongodb(?:\+srv)?://)[^@/\s]+@", "${1}[REDACTED]@"),
            (r"(?i)authorization[:\s]+(?:(?:bearer|basic)\s+)?[^\s\n]+", "[REDACTED]"),
            (r"(?i)bearer[:\s]+[^\s\n]+", "[REDACTED]"),
            (r"(?i)token[:\s]+[^\s\n]+", "[REDACTED]"),
            (r"(?i)password[:\s]+[^\s\n]+", "[REDACTED]"),
            (r"(?i)api[_-]?key[:\s]+[^\s\n]+", "[REDACTED]"),
            (r"(?i)secret[:\s]+[^\s\n]+", "[REDACTED]"),
        ];

        patterns
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| (regex, *replacement))
            })
            .collect()
    }

    /// Apply redaction guardrails to free text
    pub fn redact(&self, text: &str) -> String {
        let mut redacted = text.to_string();

        for (regex, replacement) in &self.redaction_patterns {
            redacted = regex.replace_all(&redacted, *replacement).to_string();
        }

        // Suspiciously long opaque strings are likely tokens
        if redacted.len() > 100
            && !redacted.contains(' ')
            && redacted
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "-_".contains(c))
        {
            redacted = format!("[REDACTED_LONG_STRING_{}chars]", redacted.len());
        }

        redacted
    }

    fn log_sync(
        &self,
        level: &str,
        component: &str,
        event: &str,
        message: &str,
        correlation_id: Option<&str>,
        fields: HashMap<String, serde_json::Value>,
    ) {
        if !self.enabled {
            return;
        }

        let entry = LogEntry {
            timestamp: Local::now().to_rfc3339(),
            level: level.to_string(),
            component: component.to_string(),
            event: event.to_string(),
            message: self.redact(message),
            correlation_id: Some(correlation_id.unwrap_or(&self.session_id).to_string()),
            fields,
        };

        if let Some(logger) = &self.rotating_logger {
            if let Ok(logger) = logger.lock() {
                if let Ok(json_line) = serde_json::to_string(&entry) {
                    let _ = logger.write_with_rotation(&json_line); // Logging never fails a run
                }
            }
        }
    }

    pub fn debug_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("DEBUG", component, event, message, None, HashMap::new());
    }

    pub fn error_sync(&self, component: &str, event: &str, message: &str) {
        self.log_sync("ERROR", component, event, message, None, HashMap::new());
    }

    pub fn performance_sync(&self, component: &str, operation: &str, duration_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("duration_ms".to_string(), duration_ms.into());

        self.log_sync("PERF", component, "operation_complete", operation, None, fields);
    }

    // Typed events for diagnostic runs

    pub fn run_start(&self, check_count: usize, correlation_id: &str) {
        let mut fields = HashMap::new();
        fields.insert("check_count".to_string(), check_count.into());

        self.log_sync(
            "RUN",
            "TestRunner",
            "run_start",
            &format!("Starting diagnostic run with {} checks", check_count),
            Some(correlation_id),
            fields,
        );
    }

    pub fn session_open(&self, database: &str, duration_ms: u64, correlation_id: &str) {
        let mut fields = HashMap::new();
        fields.insert("database".to_string(), database.into());
        fields.insert("duration_ms".to_string(), duration_ms.into());

        self.log_sync(
            "RUN",
            "TestRunner",
            "session_open",
            &format!("Session opened on {} ({}ms)", database, duration_ms),
            Some(correlation_id),
            fields,
        );
    }

    pub fn session_open_failed(&self, message: &str, correlation_id: &str) {
        self.log_sync(
            "ERROR",
            "TestRunner",
            "session_open_failed",
            &format!("Connection failed: {}", message),
            Some(correlation_id),
            HashMap::new(),
        );
    }

    pub fn check_end(&self, check: &str, success: bool, duration_ms: u64, correlation_id: &str) {
        let mut fields = HashMap::new();
        fields.insert("check".to_string(), check.into());
        fields.insert("success".to_string(), success.into());
        fields.insert("duration_ms".to_string(), duration_ms.into());

        self.log_sync(
            "RUN",
            "TestRunner",
            "check_end",
            &format!(
                "Check {} {} ({}ms)",
                check,
                if success { "passed" } else { "failed" },
                duration_ms
            ),
            Some(correlation_id),
            fields,
        );
    }

    pub fn session_close(&self, correlation_id: &str) {
        self.log_sync(
            "RUN",
            "TestRunner",
            "session_close",
            "Session closed",
            Some(correlation_id),
            HashMap::new(),
        );
    }

    pub fn forward_end(&self, method: &str, url: &str, status: Option<u16>, duration_ms: u64) {
        let mut fields = HashMap::new();
        fields.insert("method".to_string(), method.into());
        fields.insert("duration_ms".to_string(), duration_ms.into());
        if let Some(code) = status {
            fields.insert("http_status".to_string(), code.into());
        }

        let outcome = status
            .map(|code| code.to_string())
            .unwrap_or_else(|| "transport error".to_string());
        self.log_sync(
            "HTTP",
            "RequestForwarder",
            "forward_end",
            &format!("{} {} -> {} ({}ms)", method, url, outcome, duration_ms),
            None,
            fields,
        );
    }

    pub fn server_start(&self, bind: &str) {
        let mut fields = HashMap::new();
        fields.insert("bind".to_string(), bind.into());

        self.log_sync(
            "DEBUG",
            "Server",
            "server_start",
            &format!("Listening on {}", bind),
            None,
            fields,
        );
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

// Factory function mirroring the environment-driven default
pub fn get_debug_logger() -> DebugLogger {
    DebugLogger::new()
}
