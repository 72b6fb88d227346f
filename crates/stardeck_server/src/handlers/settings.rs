//! Settings handlers.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde_json::json;

use stardeck::Settings;

use crate::auth::require_session;
use crate::errors::ApiError;
use crate::state::AppState;

/// Placeholder returned instead of the stored API key.
const MASKED_KEY: &str = "********";

/// GET /api/settings: stored settings with the key masked.
pub async fn get_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Settings>, ApiError> {
    require_session(&state, &headers).await?;

    let mut settings = state.store.load_settings().await?;
    if !settings.openai.key.is_empty() {
        settings.openai.key = MASKED_KEY.to_string();
    }
    Ok(Json(settings))
}

/// POST /api/settings: persist settings.
///
/// A masked key in the payload means "keep the stored key".
pub async fn save_settings(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(mut settings): Json<Settings>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers).await?;

    if settings.openai.key == MASKED_KEY {
        let stored = state.store.load_settings().await?;
        settings.openai.key = stored.openai.key;
    }

    state.store.save_settings(&settings).await?;
    Ok(Json(json!({ "msg": "saved" })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{authed_state, login_headers};
    use stardeck::OpenAiSettings;

    fn configured() -> Settings {
        Settings {
            openai: OpenAiSettings {
                key: "sk-secret".to_string(),
                endpoint: "https://llm.test/v1/chat/completions".to_string(),
                model: "gpt-4o-mini".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn get_settings_masks_the_key() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        state.store.save_settings(&configured()).await.unwrap();

        let settings = get_settings(State(state), login_headers(&session_id))
            .await
            .unwrap();
        assert_eq!(settings.0.openai.key, "********");
        assert_eq!(settings.0.openai.model, "gpt-4o-mini");
    }

    #[tokio::test]
    async fn saving_a_masked_key_keeps_the_stored_secret() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let headers = login_headers(&session_id);
        state.store.save_settings(&configured()).await.unwrap();

        let mut update = configured();
        update.openai.key = "********".to_string();
        update.openai.model = "gpt-5".to_string();
        save_settings(State(state.clone()), headers, Json(update))
            .await
            .unwrap();

        let stored = state.store.load_settings().await.unwrap();
        assert_eq!(stored.openai.key, "sk-secret");
        assert_eq!(stored.openai.model, "gpt-5");
    }

    #[tokio::test]
    async fn saving_a_new_key_replaces_the_secret() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let headers = login_headers(&session_id);
        state.store.save_settings(&configured()).await.unwrap();

        let mut update = configured();
        update.openai.key = "sk-fresh".to_string();
        save_settings(State(state.clone()), headers, Json(update))
            .await
            .unwrap();

        let stored = state.store.load_settings().await.unwrap();
        assert_eq!(stored.openai.key, "sk-fresh");
    }
}
