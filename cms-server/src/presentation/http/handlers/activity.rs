use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::activity::Activity;
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const DEFAULT_ACTIVITY_LIMIT: u32 = 20;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ActivityDto {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    /// e.g. `view_post`, `login`.
    pub(crate) kind: String,
    pub(crate) post_id: Option<i64>,
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Activity> for ActivityDto {
    fn from(activity: Activity) -> Self {
        Self {
            id: activity.id,
            user_id: activity.user_id,
            kind: activity.kind.as_str().to_string(),
            post_id: activity.post_id,
            ip_address: activity.ip_address,
            user_agent: activity.user_agent,
            created_at: activity.created_at,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ActivityQuery {
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ActivityCountDto {
    pub(crate) kind: String,
    pub(crate) count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ActivitySummaryDto {
    pub(crate) counts: Vec<ActivityCountDto>,
}

#[utoipa::path(
    get,
    path = "/api/activity",
    tag = "activity",
    security(
        ("bearer_auth" = [])
    ),
    params(ActivityQuery),
    responses(
        (status = 200, description = "Own activity, newest first", body = [ActivityDto]),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn recent_activity(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Query(query): Query<ActivityQuery>,
) -> AppResult<(StatusCode, Json<Vec<ActivityDto>>)> {
    query.validate()?;
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);

    let activity = state.activity_service.recent(auth.user_id, limit).await?;
    Ok((
        StatusCode::OK,
        Json(activity.into_iter().map(ActivityDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/activity/summary",
    tag = "activity",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Count per activity kind", body = ActivitySummaryDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn activity_summary(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<ActivitySummaryDto>)> {
    let summary = state.activity_service.summary(auth.user_id).await?;
    let counts = summary
        .into_iter()
        .map(|(kind, count)| ActivityCountDto {
            kind: kind.as_str().to_string(),
            count,
        })
        .collect();
    Ok((StatusCode::OK, Json(ActivitySummaryDto { counts })))
}
