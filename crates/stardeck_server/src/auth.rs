//! Session extraction and cookie handling.
//!
//! A request authenticates with either a `Bearer` session ID in the
//! `Authorization` header or the session cookie set at login. The session
//! registry is the only authority; there is no ambient global state.

use axum::http::{HeaderMap, header};

use stardeck::Session;

use crate::errors::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "stardeck_session";

/// Cookie lifetime in seconds (matches the session registry TTL).
pub const COOKIE_MAX_AGE_SECS: u64 = 60 * 60 * 24;

/// Extract the session ID from the request headers.
///
/// The `Authorization: Bearer` form takes precedence over the cookie.
#[must_use]
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
    {
        let token = value.strip_prefix("Bearer ").unwrap_or("").trim();
        if !token.is_empty() {
            return Some(token.to_string());
        }
    }

    let cookies = headers.get(header::COOKIE).and_then(|v| v.to_str().ok())?;
    for pair in cookies.split(';') {
        let mut parts = pair.trim().splitn(2, '=');
        if parts.next() == Some(SESSION_COOKIE) {
            let value = parts.next().unwrap_or("").trim();
            if !value.is_empty() {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolve the request's session or fail with 401.
pub async fn require_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<(String, Session), ApiError> {
    let id = session_id_from_headers(headers)
        .ok_or_else(|| ApiError::unauthorized("missing session"))?;
    let session = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::unauthorized("invalid or expired session"))?;
    Ok((id, session))
}

/// Build the `Set-Cookie` value for a fresh session.
#[must_use]
pub fn session_cookie(id: &str) -> String {
    format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; Max-Age={COOKIE_MAX_AGE_SECS}")
}

/// Build the `Set-Cookie` value that clears the session cookie.
#[must_use]
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; Max-Age=0")
}
