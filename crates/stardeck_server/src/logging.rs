//! Tracing initialization.

use tracing_subscriber::EnvFilter;

use crate::config::{ServerConfig, SetupError};

/// Initialize the global tracing subscriber from the configured log level.
pub fn init_tracing(config: &ServerConfig) -> Result<(), SetupError> {
    let filter = EnvFilter::try_new(config.log_level.trim())
        .map_err(|e| SetupError::Logging(format!("invalid log_level: {e}")))?;

    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
