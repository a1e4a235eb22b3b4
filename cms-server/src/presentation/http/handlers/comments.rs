use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::activity::ClientInfo;
use crate::domain::comment::{Comment, CreateCommentRequest, ModerationDecision};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 2, max = 5000))]
    pub(crate) content: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) user_id: i64,
    pub(crate) content: String,
    /// `pending`, `approved` or `rejected`.
    pub(crate) status: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentDto {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            post_id: comment.post_id,
            user_id: comment.user_id,
            content: comment.content,
            status: comment.status.as_str().to_string(),
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/posts/{slug}/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment created, awaiting moderation", body = CommentDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    client: ClientInfo,
    Path(slug): Path<String>,
    Json(dto): Json<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    dto.validate()?;
    let req = CreateCommentRequest {
        content: dto.content,
    };

    let comment = state
        .comment_service
        .add_comment(&auth.actor, &slug, req, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{slug}/comments/moderation",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "All comments of the post", body = [CommentDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn moderation_queue(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<Vec<CommentDto>>)> {
    let comments = state
        .comment_service
        .moderation_queue(&auth.actor, &slug)
        .await?;
    Ok((
        StatusCode::OK,
        Json(comments.into_iter().map(CommentDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/approve",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment approved", body = CommentDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn approve_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    moderate(state, auth, id, ModerationDecision::Approve).await
}

#[utoipa::path(
    post,
    path = "/api/comments/{id}/reject",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment rejected", body = CommentDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn reject_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    moderate(state, auth, id, ModerationDecision::Reject).await
}

async fn moderate(
    state: AppState,
    auth: AuthenticatedUser,
    id: i64,
    decision: ModerationDecision,
) -> AppResult<(StatusCode, Json<CommentDto>)> {
    let comment = state
        .comment_service
        .moderate(&auth.actor, id, decision)
        .await?;
    Ok((StatusCode::OK, Json(CommentDto::from(comment))))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 204, description = "Comment deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .comment_service
        .delete_comment(&auth.actor, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
