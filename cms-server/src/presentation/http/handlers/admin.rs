use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::ModerationDecision;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::auth::UserDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct SelectionDto {
    #[validate(length(max = 500))]
    pub(crate) ids: Vec<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct BulkResultDto {
    pub(crate) updated: u64,
}

#[utoipa::path(
    get,
    path = "/api/admin/author-requests",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Readers waiting for the author role", body = [UserDto]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_author_requests(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<Vec<UserDto>>)> {
    let accounts = state.profile_service.pending_requests(&auth.actor).await?;
    Ok((
        StatusCode::OK,
        Json(accounts.iter().map(UserDto::from).collect()),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/author-requests/approve",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SelectionDto,
    responses(
        (status = 200, description = "Number of readers promoted", body = BulkResultDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn approve_author_requests(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<SelectionDto>,
) -> AppResult<(StatusCode, Json<BulkResultDto>)> {
    dto.validate()?;
    let updated = state
        .profile_service
        .approve_author_requests(&auth.actor, &dto.ids)
        .await?;
    Ok((StatusCode::OK, Json(BulkResultDto { updated: updated as u64 })))
}

#[utoipa::path(
    post,
    path = "/api/admin/author-requests/reject",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SelectionDto,
    responses(
        (status = 200, description = "Number of requests cleared", body = BulkResultDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn reject_author_requests(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<SelectionDto>,
) -> AppResult<(StatusCode, Json<BulkResultDto>)> {
    dto.validate()?;
    let updated = state
        .profile_service
        .reject_author_requests(&auth.actor, &dto.ids)
        .await?;
    Ok((StatusCode::OK, Json(BulkResultDto { updated: updated as u64 })))
}

#[utoipa::path(
    post,
    path = "/api/admin/comments/approve",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SelectionDto,
    responses(
        (status = 200, description = "Number of comments approved", body = BulkResultDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn approve_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<SelectionDto>,
) -> AppResult<(StatusCode, Json<BulkResultDto>)> {
    moderate_comments(state, auth, dto, ModerationDecision::Approve).await
}

#[utoipa::path(
    post,
    path = "/api/admin/comments/reject",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = SelectionDto,
    responses(
        (status = 200, description = "Number of comments rejected", body = BulkResultDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn reject_comments(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<SelectionDto>,
) -> AppResult<(StatusCode, Json<BulkResultDto>)> {
    moderate_comments(state, auth, dto, ModerationDecision::Reject).await
}

async fn moderate_comments(
    state: AppState,
    auth: AuthenticatedUser,
    dto: SelectionDto,
    decision: ModerationDecision,
) -> AppResult<(StatusCode, Json<BulkResultDto>)> {
    dto.validate()?;
    let updated = state
        .comment_service
        .moderate_in_bulk(&auth.actor, &dto.ids, decision)
        .await?;
    Ok((StatusCode::OK, Json(BulkResultDto { updated })))
}
