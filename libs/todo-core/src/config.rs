//! Configuration management for the todo server
//!
//! Precedence, lowest to highest: built-in defaults, a YAML or JSON file,
//! `TODO_*` environment variables. Command-line flags are applied on top by
//! the binary.

use crate::database::DatabasePoolConfig;
use crate::error::{Result, TodoError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_DATABASE_PATH: &str = "TODO_DATABASE_PATH";
pub const ENV_HOST: &str = "TODO_HOST";
pub const ENV_PORT: &str = "TODO_PORT";
pub const ENV_LOG_FORMAT: &str = "TODO_LOG_FORMAT";

/// Output format for log lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = TodoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(TodoError::configuration(format!(
                "Unknown log format '{other}' (expected 'pretty' or 'json')"
            ))),
        }
    }
}

/// Configuration for the todo server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    /// Path to the SQLite database file
    pub database_path: PathBuf,
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    pub log_format: LogFormat,
    pub pool: DatabasePoolConfig,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("todoApplication.db"),
            host: "127.0.0.1".to_string(),
            port: 3000,
            log_format: LogFormat::default(),
            pool: DatabasePoolConfig::default(),
        }
    }
}

impl TodoConfig {
    /// Create a configuration for a database path, all else default
    #[must_use]
    pub fn new<P: AsRef<Path>>(database_path: P) -> Self {
        Self {
            database_path: database_path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Load a configuration file; `.json` is read as JSON, anything else as YAML
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let config = if is_json {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content).map_err(|e| {
                TodoError::configuration(format!("Failed to parse {}: {e}", path.display()))
            })?
        };

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `TODO_*` environment variables on top of this configuration
    ///
    /// # Errors
    /// Returns an error if a variable is set to an unparseable value
    pub fn apply_env(self) -> Result<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (the environment in production)
    ///
    /// # Errors
    /// Returns an error if a value is unparseable
    pub fn apply_vars<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(ENV_DATABASE_PATH) {
            debug!("{ENV_DATABASE_PATH} overrides database path");
            self.database_path = PathBuf::from(path);
        }

        if let Some(host) = lookup(ENV_HOST) {
            self.host = host;
        }

        if let Some(port) = lookup(ENV_PORT) {
            self.port = port.parse().map_err(|_| {
                TodoError::configuration(format!("{ENV_PORT} must be a port number, got '{port}'"))
            })?;
        }

        if let Some(format) = lookup(ENV_LOG_FORMAT) {
            self.log_format = format.parse()?;
        }

        Ok(self)
    }

    /// Check the configuration for values the server cannot start with
    ///
    /// # Errors
    /// Returns `TodoError::Configuration` describing the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(TodoError::configuration("database_path must not be empty"));
        }

        if self.port == 0 {
            return Err(TodoError::configuration("port must not be 0"));
        }

        if self.pool.max_connections == 0 {
            return Err(TodoError::configuration(
                "pool.max_connections must be at least 1",
            ));
        }

        if self.pool.min_connections > self.pool.max_connections {
            return Err(TodoError::configuration(
                "pool.min_connections must not exceed pool.max_connections",
            ));
        }

        Ok(())
    }

    /// `host:port` string for binding the listener
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
