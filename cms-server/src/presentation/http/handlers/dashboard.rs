use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::blog_service::{AuthorDashboard, AuthorStats};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::posts::PostDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorStatsDto {
    pub(crate) total_posts: i64,
    pub(crate) published_posts: i64,
    pub(crate) draft_posts: i64,
    pub(crate) total_comments: i64,
    pub(crate) total_views: i64,
}

impl From<AuthorStats> for AuthorStatsDto {
    fn from(stats: AuthorStats) -> Self {
        Self {
            total_posts: stats.total_posts,
            published_posts: stats.published_posts,
            draft_posts: stats.draft_posts,
            total_comments: stats.total_comments,
            total_views: stats.total_views,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct DashboardDto {
    /// Drafts included, newest first.
    pub(crate) posts: Vec<PostDto>,
    pub(crate) stats: AuthorStatsDto,
}

impl From<AuthorDashboard> for DashboardDto {
    fn from(dashboard: AuthorDashboard) -> Self {
        Self {
            posts: dashboard.posts.into_iter().map(PostDto::from).collect(),
            stats: dashboard.stats.into(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "dashboard",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Own posts and totals", body = DashboardDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Author role required"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn dashboard(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<DashboardDto>)> {
    let dashboard = state.blog_service.dashboard(&auth.actor).await?;
    Ok((StatusCode::OK, Json(DashboardDto::from(dashboard))))
}
