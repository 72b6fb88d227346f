//! Shared fixtures for handler tests.

use std::sync::Arc;

use axum::http::{HeaderMap, HeaderValue, header};

use stardeck::http::MockTransport;
use stardeck::{FileStore, Session, SessionRegistry};

use crate::config::ServerConfig;
use crate::state::AppState;

/// Base URL the mock transport answers for in tests.
pub const TEST_API_URL: &str = "https://github.test";

/// Build an [`AppState`] wired to a mock transport and a temp data dir.
pub async fn test_state() -> (AppState, MockTransport, tempfile::TempDir) {
    let transport = MockTransport::new();
    let dir = tempfile::tempdir().expect("temp dir");
    let store = Arc::new(FileStore::open(dir.path()).await.expect("file store"));

    let config = ServerConfig {
        github_api_url: TEST_API_URL.to_string(),
        ..ServerConfig::default()
    };

    let state = AppState {
        config: Arc::new(config),
        store,
        sessions: Arc::new(SessionRegistry::default()),
        transport: Arc::new(transport.clone()),
    };

    (state, transport, dir)
}

/// A test state with one logged-in session already present.
pub async fn authed_state() -> (AppState, MockTransport, String, tempfile::TempDir) {
    let (state, transport, dir) = test_state().await;
    let session_id = state
        .sessions
        .insert(Session {
            access_token: "gh-token".to_string(),
            login: "alice".to_string(),
            avatar_url: "https://avatars.test/alice".to_string(),
        })
        .await;
    (state, transport, session_id, dir)
}

/// Headers carrying a bearer session ID.
pub fn login_headers(session_id: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {session_id}")).expect("header value"),
    );
    headers
}
