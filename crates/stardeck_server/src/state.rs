//! Shared application state.

use std::sync::Arc;

use stardeck::github::GitHubClient;
use stardeck::http::HttpTransport;
use stardeck::{FileStore, SessionRegistry};

use crate::config::ServerConfig;

/// State handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub store: Arc<FileStore>,
    pub sessions: Arc<SessionRegistry>,
    pub transport: Arc<dyn HttpTransport>,
}

impl AppState {
    /// Build a GitHub client bound to a session's access token.
    #[must_use]
    pub fn github_client(&self, token: &str) -> GitHubClient {
        GitHubClient::new(Arc::clone(&self.transport), token)
            .with_base_url(&self.config.github_api_url)
    }
}
