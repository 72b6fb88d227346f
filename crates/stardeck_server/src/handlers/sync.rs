//! Sync endpoints: one-shot and WebSocket streaming.
//!
//! Both endpoints run the same orchestration; they differ only in how the
//! outcome is delivered. The WebSocket variant streams progress events and
//! ends with a `complete` or `error` event; the one-shot variant answers
//! with the merged count or an error payload.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tokio::sync::Mutex;

use stardeck::github::GitHubClient;
use stardeck::sync::{ProgressEvent, ProgressSink, SyncEngine};
use stardeck::Session;

use crate::auth::require_session;
use crate::errors::ApiError;
use crate::state::AppState;

/// POST /api/sync: run a full sync and answer with the merged count.
pub async fn sync_once(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    let (_, session) = require_session(&state, &headers).await?;

    let engine = engine_for(&state, &session);
    let outcome = engine
        .run(None)
        .await
        .map_err(|e| ApiError::internal(format!("sync failed: {e}")))?;

    Ok(Json(json!({
        "msg": "sync complete",
        "count": outcome.merged,
    })))
}

/// GET /api/sync/ws: run a sync, streaming progress over a WebSocket.
pub async fn sync_ws(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Response {
    let session = match require_session(&state, &headers).await {
        Ok((_, session)) => session,
        Err(e) => return e.into_response(),
    };

    ws.on_upgrade(move |socket| run_sync_socket(socket, state, session))
}

async fn run_sync_socket(socket: WebSocket, state: AppState, session: Session) {
    let sink: Arc<dyn ProgressSink> = Arc::new(WsSink::new(socket));
    let engine = engine_for(&state, &session);

    // Terminal error events are emitted by the engine itself; nothing more
    // to send here on failure.
    if let Err(e) = engine.run(Some(sink)).await {
        tracing::warn!(login = %session.login, error = %e, "streaming sync failed");
    }
}

fn engine_for(state: &AppState, session: &Session) -> SyncEngine {
    let client: GitHubClient = state.github_client(&session.access_token);
    SyncEngine::new(client, Arc::clone(&state.store))
}

/// Progress sink that writes JSON events to one WebSocket.
///
/// Many page workers produce events concurrently; the socket is wrapped in
/// a mutex so writes cannot interleave. Delivery is best-effort: a failed
/// send is dropped, never propagated back into the sync.
struct WsSink {
    socket: Mutex<WebSocket>,
}

impl WsSink {
    fn new(socket: WebSocket) -> Self {
        Self {
            socket: Mutex::new(socket),
        }
    }
}

#[async_trait]
impl ProgressSink for WsSink {
    async fn send(&self, event: ProgressEvent) {
        let json = match serde_json::to_string(&event) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "failed to encode progress event");
                return;
            }
        };

        let mut socket = self.socket.lock().await;
        if let Err(e) = socket.send(Message::Text(json.into())).await {
            tracing::debug!(error = %e, "progress delivery failed, client likely gone");
        }
    }
}
