//! Server configuration.
//!
//! All process-wide configuration comes from the environment with a
//! `STARDECK_` prefix (`STARDECK_PORT`, `STARDECK_DATA_DIR`, ...), with
//! built-in defaults for local use.

use config::{Config, Environment};
use serde::Deserialize;
use thiserror::Error;

/// Errors during server startup.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid log filter: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Invalid(String),
}

/// Process-wide server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory for the snapshot store.
    pub data_dir: String,
    /// Log verbosity (an `EnvFilter` directive).
    pub log_level: String,
    /// GitHub API base URL.
    pub github_api_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8181,
            data_dir: "data".to_string(),
            log_level: "info".to_string(),
            github_api_url: stardeck::github::DEFAULT_API_URL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `STARDECK_*` environment variables.
    pub fn load() -> Result<Self, SetupError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("STARDECK"))
            .build()?;
        Ok(config.try_deserialize()?)
    }

    /// The `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
