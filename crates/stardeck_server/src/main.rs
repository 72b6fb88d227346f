//! Stardeck server entry point.
//!
//! A single long-running process exposing the dashboard API. All
//! configuration comes from `STARDECK_*` environment variables.

mod auth;
mod config;
mod errors;
mod handlers;
mod logging;
mod state;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use stardeck::http::ReqwestTransport;
use stardeck::{FileStore, SessionRegistry};

use config::{ServerConfig, SetupError};
use state::AppState;

#[tokio::main]
async fn main() -> Result<(), SetupError> {
    let config = ServerConfig::load()?;
    logging::init_tracing(&config)?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        data_dir = %config.data_dir,
        "starting stardeck server"
    );

    let store = Arc::new(
        FileStore::open(&config.data_dir)
            .await
            .map_err(|e| SetupError::Invalid(format!("failed to open data dir: {e}")))?,
    );
    let transport = Arc::new(
        ReqwestTransport::with_default_timeout()
            .map_err(|e| SetupError::Invalid(format!("failed to build http client: {e}")))?,
    );

    let addr = config.bind_addr();
    let state = AppState {
        config: Arc::new(config),
        store,
        sessions: Arc::new(SessionRegistry::default()),
        transport,
    };

    let app = handlers::router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| SetupError::Invalid(format!("http server error: {e}")))?;

    Ok(())
}
