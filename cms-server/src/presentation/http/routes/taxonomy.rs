use axum::{Router, routing::get};

use crate::presentation::AppState;
use crate::presentation::http::handlers::taxonomy::{
    category_posts, list_categories, popular_tags, tag_posts,
};

pub(crate) fn categories() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories))
        .route("/{slug}/posts", get(category_posts))
}

pub(crate) fn tags() -> Router<AppState> {
    Router::new()
        .route("/popular", get(popular_tags))
        .route("/{slug}/posts", get(tag_posts))
}
