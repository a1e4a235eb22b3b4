use axum::{Router, middleware, routing::{get, post}};

use crate::presentation::AppState;
use crate::presentation::http::handlers::admin::{
    approve_author_requests, approve_comments, list_author_requests, reject_author_requests,
    reject_comments,
};
use crate::presentation::http::handlers::taxonomy::{create_category, create_tag};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

/// Staff checks happen in the services; this layer only requires a token.
pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/author-requests", get(list_author_requests))
        .route("/author-requests/approve", post(approve_author_requests))
        .route("/author-requests/reject", post(reject_author_requests))
        .route("/comments/approve", post(approve_comments))
        .route("/comments/reject", post(reject_comments))
        .route("/categories", post(create_category))
        .route("/tags", post(create_tag))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
