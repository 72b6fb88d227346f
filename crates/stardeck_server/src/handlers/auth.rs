//! Login, logout, and identity handlers.
//!
//! Login takes a personal access token, verifies it against the GitHub
//! user endpoint, and issues a session cookie. There is no OAuth dance.

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use stardeck::Session;

use crate::auth::{clear_session_cookie, require_session, session_cookie, session_id_from_headers};
use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct Identity {
    pub login: String,
    pub avatar_url: String,
}

/// POST /auth/login: verify a token and create a session.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Response, ApiError> {
    let token = body.token.trim().to_string();
    if token.is_empty() {
        return Err(ApiError::bad_request("token is required"));
    }

    let client = state.github_client(&token);
    let user = client.get_authenticated_user().await.map_err(|e| {
        if e.is_auth() {
            ApiError::unauthorized("GitHub rejected the token")
        } else {
            ApiError::internal(format!("failed to verify token: {e}"))
        }
    })?;

    tracing::info!(login = %user.login, "user logged in");

    let session_id = state
        .sessions
        .insert(Session {
            access_token: token,
            login: user.login.clone(),
            avatar_url: user.avatar_url.clone(),
        })
        .await;

    let mut response = Json(Identity {
        login: user.login,
        avatar_url: user.avatar_url,
    })
    .into_response();
    let cookie = HeaderValue::from_str(&session_cookie(&session_id))
        .map_err(|e| ApiError::internal(format!("invalid cookie value: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// POST /auth/logout: destroy the session and clear the cookie.
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Some(id) = session_id_from_headers(&headers) {
        state.sessions.remove(&id).await;
    }

    let mut response = Json(serde_json::json!({ "msg": "logged out" })).into_response();
    let cookie = HeaderValue::from_str(&clear_session_cookie())
        .map_err(|e| ApiError::internal(format!("invalid cookie value: {e}")))?;
    response.headers_mut().insert(header::SET_COOKIE, cookie);
    Ok(response)
}

/// GET /api/user: the authenticated identity.
pub async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Identity>, ApiError> {
    let (_, session) = require_session(&state, &headers).await?;
    Ok(Json(Identity {
        login: session.login,
        avatar_url: session.avatar_url,
    }))
}
