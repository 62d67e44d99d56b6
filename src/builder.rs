//! Builder pattern for creating a configured logger.
//!
//! This module provides a convenient builder API for configuring and creating
//! a [`Logger`] in a single chain of method calls.
//!
//! # Example
//!
//! ```rust,no_run
//! use fieldlog::{LogFormat, LogLevel};
//!
//! // Plain text on stderr
//! let logger = fieldlog::builder()
//!     .with_level(LogLevel::Debug)
//!     .init()
//!     .expect("Failed to initialize logging");
//!
//! // JSON lines appended to a file and forwarded to the remote service
//! let logger = fieldlog::builder()
//!     .with_file("/var/log/app.log")
//!     .with_format(LogFormat::Json)
//!     .with_remote_token("customer-token")
//!     .install()
//!     .expect("Failed to initialize logging");
//! ```

use std::path::PathBuf;

use crate::config::RemoteConfig;
use crate::{LogConfig, LogFormat, LogLevel, Logger, Result};

/// A builder for configuring and creating a [`Logger`].
#[derive(Debug, Clone, Default)]
pub struct LogBuilder {
    config: LogConfig,
}

impl LogBuilder {
    /// Create a new LogBuilder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a LogBuilder from an existing configuration.
    pub fn from_config(config: LogConfig) -> Self {
        Self { config }
    }

    /// Forward entries to the remote service using `token`.
    pub fn with_remote_token(mut self, token: impl Into<String>) -> Self {
        self.config = self.config.with_remote_token(token);
        self
    }

    /// Append output to a file instead of stderr.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_file(path);
        self
    }

    /// Set the initial threshold.
    pub fn with_level(mut self, level: LogLevel) -> Self {
        self.config = self.config.with_level(level);
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.config = self.config.with_format(format);
        self
    }

    /// Override the remote service settings.
    pub fn with_remote(mut self, remote: RemoteConfig) -> Self {
        self.config = self.config.with_remote(remote);
        self
    }

    /// Get the current configuration without creating a logger.
    pub fn build(self) -> LogConfig {
        self.config
    }

    /// Create the logger.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The log file cannot be opened
    /// - The remote worker cannot be started
    pub fn init(self) -> Result<Logger> {
        Logger::from_config(&self.config)
    }

    /// Create the logger and install it as the process default.
    pub fn install(self) -> Result<Logger> {
        let logger = self.init()?;
        crate::global::set_global(logger.clone());
        Ok(logger)
    }
}
