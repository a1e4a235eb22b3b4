use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::health::healthz;

pub(crate) mod account;
pub(crate) mod admin;
pub(crate) mod auth;
pub(crate) mod comments;
pub(crate) mod posts;
pub(crate) mod taxonomy;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api/auth", auth::router(state.clone()))
        .nest("/api/posts", posts::router(state.clone()))
        .nest("/api/comments", comments::router(state.clone()))
        .nest("/api/categories", taxonomy::categories())
        .nest("/api/tags", taxonomy::tags())
        .nest("/api/profile", account::profile(state.clone()))
        .nest("/api/dashboard", account::dashboard_router(state.clone()))
        .nest("/api/activity", account::activity(state.clone()))
        .nest("/api/admin", admin::router(state.clone()))
        .with_state(state)
}
