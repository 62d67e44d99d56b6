use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::formatter::{Formatter, JsonFormatter, TextFormatter};
use crate::LogLevel;

/// Default bulk endpoint of the hosted log service.
pub const DEFAULT_ENDPOINT: &str = "https://logs-01.loggly.com/bulk/";

/// Configuration for logging
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Token for the remote log service; empty disables forwarding
    #[serde(default)]
    pub remote_token: String,
    /// Append output to this file instead of stderr
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Minimum level emitted
    #[serde(default)]
    pub level: LogLevel,
    /// Line format
    #[serde(default)]
    pub format: LogFormat,
    /// Remote service settings
    #[serde(default)]
    pub remote: RemoteConfig,
}

impl LogConfig {
    /// Create a new LogConfig with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the remote service token
    pub fn with_remote_token(mut self, token: impl Into<String>) -> Self {
        self.remote_token = token.into();
        self
    }

    /// Set the output file
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Set log level
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.level = level;
        self
    }

    /// Set log format
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set remote service settings
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.remote = remote;
        self
    }
}

/// Output line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    pub fn formatter(self) -> Box<dyn Formatter> {
        match self {
            LogFormat::Text => Box::new(TextFormatter::new()),
            LogFormat::Json => Box::new(JsonFormatter::new()),
        }
    }
}

/// Settings for the remote log service hook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Bulk endpoint; the token and tags are appended to it
    pub endpoint: String,
    /// Static tags attached to every shipped entry
    pub tags: Vec<String>,
    /// Seconds between background flushes
    pub flush_interval_secs: u64,
    /// Pending entries that force an early flush
    pub buffer_size: usize,
    /// Per-request timeout in seconds; 0 disables the timeout
    pub timeout_secs: u64,
}

impl RemoteConfig {
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            tags: vec!["rust".to_string(), "fieldlog".to_string()],
            flush_interval_secs: 5,
            buffer_size: 100,
            timeout_secs: 30,
        }
    }
}
