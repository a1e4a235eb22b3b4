use axum::{Router, middleware, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::activity::{activity_summary, recent_activity};
use crate::presentation::http::handlers::dashboard::dashboard;
use crate::presentation::http::handlers::profile::{
    author_request_status, get_profile, request_author, update_profile,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn profile(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile).put(update_profile))
        .route(
            "/author-request",
            get(author_request_status).post(request_author),
        )
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

pub(crate) fn dashboard_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

pub(crate) fn activity(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(recent_activity))
        .route("/summary", get(activity_summary))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
