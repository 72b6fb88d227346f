//! Repository listing, annotation CRUD, stats, and AI analysis.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::HeaderMap;
use serde::Deserialize;
use serde_json::json;

use stardeck::ai::{AiClient, AiError};
use stardeck::{Annotation, Category, Repo, Stats, StoreError};

use crate::auth::require_session;
use crate::errors::ApiError;
use crate::state::AppState;

/// GET /api/repos: the snapshot with annotations applied.
///
/// When an AI-refined description exists it replaces the original
/// description in the response, the way the dashboard presents repos.
pub async fn list_repos(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Vec<Repo>>, ApiError> {
    require_session(&state, &headers).await?;

    let mut repos = match state.store.load_repos().await {
        Ok(repos) => repos,
        Err(StoreError::NotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };

    for repo in &mut repos {
        if !repo.ai_description.is_empty() {
            repo.description = repo.ai_description.clone();
        }
    }

    Ok(Json(repos))
}

/// GET /api/stats: dashboard statistics.
pub async fn stats(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Stats>, ApiError> {
    require_session(&state, &headers).await?;
    Ok(Json(state.store.stats().await?))
}

/// GET /api/categories: the fixed category list.
pub async fn categories(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers).await?;

    let list: Vec<serde_json::Value> = Category::ALL
        .iter()
        .map(|c| json!({ "value": c.as_str(), "label": c.label() }))
        .collect();
    Ok(Json(serde_json::Value::Array(list)))
}

#[derive(Debug, Deserialize)]
pub struct TagBody {
    #[serde(default)]
    pub tag: String,
}

#[derive(Debug, Deserialize)]
pub struct CategoryBody {
    #[serde(default)]
    pub category: String,
}

#[derive(Debug, Deserialize)]
pub struct DescriptionBody {
    #[serde(default)]
    pub description: String,
}

/// POST /api/repos/{id}/tag: set or clear the user tag.
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<TagBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers).await?;

    let mut annotation = existing_annotation(&state, id).await?;
    annotation.tag = body.tag;
    state.store.save_annotation(annotation).await?;

    Ok(Json(json!({ "msg": "updated" })))
}

/// POST /api/repos/{id}/category: set or clear the category.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<CategoryBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers).await?;

    let category = if body.category.trim().is_empty() {
        None
    } else {
        Some(
            body.category
                .parse::<Category>()
                .map_err(|e| ApiError::bad_request(e.to_string()))?,
        )
    };

    let mut annotation = existing_annotation(&state, id).await?;
    annotation.category = category;
    state.store.save_annotation(annotation).await?;

    Ok(Json(json!({ "msg": "updated" })))
}

/// POST /api/repos/{id}/description: set or clear the refined description.
pub async fn update_description(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
    Json(body): Json<DescriptionBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_session(&state, &headers).await?;

    let mut annotation = existing_annotation(&state, id).await?;
    annotation.description = body.description;
    state.store.save_annotation(annotation).await?;

    Ok(Json(json!({ "msg": "updated" })))
}

/// POST /api/repos/{id}/analyze: run AI analysis and persist the result.
pub async fn analyze(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    headers: HeaderMap,
) -> Result<Json<stardeck::ai::AiAnalysis>, ApiError> {
    require_session(&state, &headers).await?;

    let settings = state.store.load_settings().await?;
    if !settings.openai.is_configured() {
        return Err(ApiError::bad_request(
            "AI settings are incomplete; configure them first",
        ));
    }

    let repos = match state.store.load_repos().await {
        Ok(repos) => repos,
        Err(StoreError::NotFound) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    let repo = repos
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| ApiError::not_found(format!("no repository with id {id}")))?;

    let analysis = AiClient::new(state.transport.clone())
        .analyze(&settings.openai, &repo)
        .await
        .map_err(|e| match e {
            AiError::NotConfigured => ApiError::bad_request(e.to_string()),
            AiError::Incomplete => ApiError::internal("AI analysis was incomplete; try again"),
            other => ApiError::internal(format!("AI analysis failed: {other}")),
        })?;

    let mut annotation = existing_annotation(&state, id).await?;
    if analysis.category.is_some() {
        annotation.category = analysis.category;
    }
    annotation.tag = analysis.tags.join(",");
    annotation.description = analysis.description.clone();
    state.store.save_annotation(annotation).await?;

    tracing::info!(repo_id = id, "AI analysis saved");
    Ok(Json(analysis))
}

async fn existing_annotation(state: &AppState, id: i64) -> Result<Annotation, ApiError> {
    Ok(state
        .store
        .annotation(id)
        .await?
        .unwrap_or_else(|| Annotation::new(id)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{authed_state, login_headers};
    use stardeck::http::HttpMethod;
    use stardeck::{OpenAiSettings, Settings};

    fn repo(id: i64, name: &str) -> Repo {
        Repo {
            id,
            name: name.to_string(),
            html_url: format!("https://github.com/o/{name}"),
            stargazers_count: 1,
            description: "original".to_string(),
            language: "Rust".to_string(),
            languages: vec!["Rust".to_string()],
            topics: Vec::new(),
            readme_url: String::new(),
            tag: String::new(),
            category: None,
            ai_description: String::new(),
        }
    }

    #[tokio::test]
    async fn list_repos_is_empty_before_first_sync() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let repos = list_repos(State(state), login_headers(&session_id))
            .await
            .unwrap();
        assert!(repos.0.is_empty());
    }

    #[tokio::test]
    async fn list_repos_substitutes_ai_description() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        state.store.save_repos(&[repo(1, "a")]).await.unwrap();
        state
            .store
            .save_annotation(Annotation {
                id: 1,
                tag: String::new(),
                category: None,
                description: "refined".to_string(),
            })
            .await
            .unwrap();

        let repos = list_repos(State(state), login_headers(&session_id))
            .await
            .unwrap();
        assert_eq!(repos.0[0].description, "refined");
        assert_eq!(repos.0[0].ai_description, "refined");
    }

    #[tokio::test]
    async fn handlers_reject_missing_session() {
        let (state, _transport, _session_id, _dir) = authed_state().await;
        let err = list_repos(State(state), HeaderMap::new())
            .await
            .expect_err("no session should 401");
        assert_eq!(err.status(), 401);
    }

    #[tokio::test]
    async fn tag_lifecycle_creates_updates_and_tombstones() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let headers = login_headers(&session_id);

        update_tag(
            State(state.clone()),
            Path(7),
            headers.clone(),
            Json(TagBody {
                tag: "cool".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            state.store.annotation(7).await.unwrap().unwrap().tag,
            "cool"
        );

        // Clearing the only field deletes the record.
        update_tag(
            State(state.clone()),
            Path(7),
            headers,
            Json(TagBody { tag: String::new() }),
        )
        .await
        .unwrap();
        assert!(state.store.annotation(7).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn category_update_validates_the_enumeration() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let headers = login_headers(&session_id);

        update_category(
            State(state.clone()),
            Path(3),
            headers.clone(),
            Json(CategoryBody {
                category: "devops".to_string(),
            }),
        )
        .await
        .unwrap();
        assert_eq!(
            state.store.annotation(3).await.unwrap().unwrap().category,
            Some(Category::DevOps)
        );

        let err = update_category(
            State(state.clone()),
            Path(3),
            headers.clone(),
            Json(CategoryBody {
                category: "astrology".to_string(),
            }),
        )
        .await
        .expect_err("unknown category should 400");
        assert_eq!(err.status(), 400);

        // Empty category clears; record then tombstones.
        update_category(
            State(state.clone()),
            Path(3),
            headers,
            Json(CategoryBody {
                category: String::new(),
            }),
        )
        .await
        .unwrap();
        assert!(state.store.annotation(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn description_update_preserves_other_fields() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let headers = login_headers(&session_id);

        update_tag(
            State(state.clone()),
            Path(5),
            headers.clone(),
            Json(TagBody {
                tag: "keep".to_string(),
            }),
        )
        .await
        .unwrap();
        update_description(
            State(state.clone()),
            Path(5),
            headers,
            Json(DescriptionBody {
                description: "better words".to_string(),
            }),
        )
        .await
        .unwrap();

        let annotation = state.store.annotation(5).await.unwrap().unwrap();
        assert_eq!(annotation.tag, "keep");
        assert_eq!(annotation.description, "better words");
    }

    #[tokio::test]
    async fn stats_reflect_snapshot_and_annotations() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        state
            .store
            .save_repos(&[repo(1, "a"), repo(2, "b")])
            .await
            .unwrap();
        state
            .store
            .save_annotation(Annotation {
                id: 1,
                tag: "t".to_string(),
                category: None,
                description: String::new(),
            })
            .await
            .unwrap();

        let stats = stats(State(state), login_headers(&session_id))
            .await
            .unwrap();
        assert_eq!(stats.0.total_repos, 2);
        assert_eq!(stats.0.annotated_repos, 1);
    }

    #[tokio::test]
    async fn categories_lists_the_fixed_enumeration() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let list = categories(State(state), login_headers(&session_id))
            .await
            .unwrap();
        let items = list.0.as_array().unwrap();
        assert_eq!(items.len(), 10);
        assert_eq!(items[0]["value"], "frontend");
        assert_eq!(items[0]["label"], "Frontend");
    }

    #[tokio::test]
    async fn analyze_requires_configured_settings() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        let err = analyze(State(state), Path(1), login_headers(&session_id))
            .await
            .expect_err("unconfigured AI should 400");
        assert_eq!(err.status(), 400);
    }

    #[tokio::test]
    async fn analyze_persists_the_annotation() {
        let (state, transport, session_id, _dir) = authed_state().await;
        state.store.save_repos(&[repo(9, "thing")]).await.unwrap();
        state
            .store
            .save_settings(&Settings {
                openai: OpenAiSettings {
                    key: "k".to_string(),
                    endpoint: "https://llm.test/v1/chat/completions".to_string(),
                    model: "gpt-4o-mini".to_string(),
                },
            })
            .await
            .unwrap();

        let content =
            r#"{"category":"tooling","tags":["cli","fast"],"description":"A fast tool."}"#;
        transport.push_json(
            HttpMethod::Post,
            "https://llm.test/v1/chat/completions",
            &serde_json::json!({
                "choices": [{ "message": { "content": content } }]
            })
            .to_string(),
        );

        let analysis = analyze(State(state.clone()), Path(9), login_headers(&session_id))
            .await
            .unwrap();
        assert_eq!(analysis.0.category, Some(Category::Tooling));

        let annotation = state.store.annotation(9).await.unwrap().unwrap();
        assert_eq!(annotation.category, Some(Category::Tooling));
        assert_eq!(annotation.tag, "cli,fast");
        assert_eq!(annotation.description, "A fast tool.");
    }

    #[tokio::test]
    async fn analyze_unknown_repo_is_404() {
        let (state, _transport, session_id, _dir) = authed_state().await;
        state
            .store
            .save_settings(&Settings {
                openai: OpenAiSettings {
                    key: "k".to_string(),
                    endpoint: "https://llm.test/x".to_string(),
                    model: "m".to_string(),
                },
            })
            .await
            .unwrap();

        let err = analyze(State(state), Path(404), login_headers(&session_id))
            .await
            .expect_err("missing repo should 404");
        assert_eq!(err.status(), 404);
    }
}
