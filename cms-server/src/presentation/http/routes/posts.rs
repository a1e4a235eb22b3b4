use axum::Router;
use axum::middleware;
use axum::routing::{get, post, put};

use crate::presentation::AppState;
use crate::presentation::http::handlers::comments::{add_comment, moderation_queue};
use crate::presentation::http::handlers::posts::{
    create_post, delete_post, get_post, list_posts, popular_posts, search_posts, update_post,
};
use crate::presentation::http::middleware::auth::{
    jwt_auth_middleware, optional_jwt_auth_middleware,
};

pub(crate) fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(list_posts))
        .route("/popular", get(popular_posts))
        .route("/search", get(search_posts));

    // Drafts are visible to their author and staff, so the viewer is
    // resolved when a token is sent.
    let detail = Router::new()
        .route("/{slug}", get(get_post))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            optional_jwt_auth_middleware,
        ));

    let protected = Router::new()
        .route("/", post(create_post))
        .route("/{slug}", put(update_post).delete(delete_post))
        .route("/{slug}/comments", post(add_comment))
        .route("/{slug}/comments/moderation", get(moderation_queue))
        .layer(middleware::from_fn_with_state(state, jwt_auth_middleware));

    public.merge(detail).merge(protected)
}
