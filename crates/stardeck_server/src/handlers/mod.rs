//! HTTP route handlers.

pub mod auth;
pub mod repos;
pub mod settings;
pub mod sync;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/api/user", get(auth::current_user))
        .route("/api/repos", get(repos::list_repos))
        .route("/api/stats", get(repos::stats))
        .route("/api/categories", get(repos::categories))
        .route("/api/repos/{id}/tag", post(repos::update_tag))
        .route("/api/repos/{id}/category", post(repos::update_category))
        .route("/api/repos/{id}/description", post(repos::update_description))
        .route("/api/repos/{id}/analyze", post(repos::analyze))
        .route(
            "/api/settings",
            get(settings::get_settings).post(settings::save_settings),
        )
        .route("/api/sync", post(sync::sync_once))
        .route("/api/sync/ws", get(sync::sync_ws))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
