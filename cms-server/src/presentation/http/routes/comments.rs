use axum::{Router, middleware, routing::{delete, post}};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{
    approve_comment, delete_comment, reject_comment,
};
use crate::presentation::http::middleware::auth::jwt_auth_middleware;

pub(crate) fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{id}", delete(delete_comment))
        .route("/{id}/approve", post(approve_comment))
        .route("/{id}/reject", post(reject_comment))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}
