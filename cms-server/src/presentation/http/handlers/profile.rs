use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::profile_service::ProfileView;
use crate::data::user_repository::UserAccount;
use crate::domain::profile::{AuthorRequestStatus, UpdateProfileRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::activity::ActivityDto;
use crate::presentation::http::handlers::auth::UserDto;
use crate::presentation::http::handlers::comments::CommentDto;
use crate::presentation::http::handlers::posts::PostDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) user: UserDto,
    pub(crate) bio: String,
    pub(crate) website: String,
    pub(crate) role: String,
    pub(crate) author_request_pending: bool,
    /// `approved`, `pending` or `none`.
    pub(crate) request_status: String,
    pub(crate) profile_created_at: DateTime<Utc>,
    pub(crate) profile_updated_at: DateTime<Utc>,
    /// Own posts, drafts included.
    pub(crate) posts: Vec<PostDto>,
    /// Own comments in every moderation status.
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) recent_activity: Vec<ActivityDto>,
}

impl ProfileDto {
    fn new(account: &UserAccount) -> Self {
        Self {
            user: UserDto::from(account),
            bio: account.profile.bio.clone(),
            website: account.profile.website.clone(),
            role: account.profile.role.as_str().to_string(),
            author_request_pending: account.profile.author_request_pending,
            request_status: account.profile.request_status().as_str().to_string(),
            profile_created_at: account.profile.created_at,
            profile_updated_at: account.profile.updated_at,
            posts: Vec::new(),
            comments: Vec::new(),
            recent_activity: Vec::new(),
        }
    }
}

impl From<ProfileView> for ProfileDto {
    fn from(view: ProfileView) -> Self {
        Self {
            posts: view.posts.into_iter().map(PostDto::from).collect(),
            comments: view.comments.into_iter().map(CommentDto::from).collect(),
            recent_activity: view
                .recent_activity
                .into_iter()
                .map(ActivityDto::from)
                .collect(),
            ..Self::new(&view.account)
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(email)]
    pub(crate) email: String,
    /// Omitted clears the name.
    #[validate(length(max = 30))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 150))]
    pub(crate) last_name: Option<String>,
    #[validate(length(max = 2000))]
    pub(crate) bio: Option<String>,
    /// Empty clears the website.
    #[validate(length(max = 200))]
    pub(crate) website: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthorRequestDto {
    /// `approved`, `pending` or `none`.
    pub(crate) status: String,
}

impl From<AuthorRequestStatus> for AuthorRequestDto {
    fn from(status: AuthorRequestStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Own profile with posts, comments and recent activity", body = ProfileDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<ProfileDto>)> {
    let view = state.profile_service.profile(auth.user_id).await?;
    Ok((StatusCode::OK, Json(ProfileDto::from(view))))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = ProfileDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<UpdateProfileDto>,
) -> AppResult<(StatusCode, Json<ProfileDto>)> {
    dto.validate()?;
    let req = UpdateProfileRequest {
        email: dto.email,
        first_name: dto.first_name.unwrap_or_default(),
        last_name: dto.last_name.unwrap_or_default(),
        bio: dto.bio.unwrap_or_default(),
        website: dto.website.unwrap_or_default(),
    };

    let account = state
        .profile_service
        .update_profile(auth.user_id, req)
        .await?;
    Ok((StatusCode::OK, Json(ProfileDto::new(&account))))
}

#[utoipa::path(
    post,
    path = "/api/profile/author-request",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current request status", body = AuthorRequestDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn request_author(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<AuthorRequestDto>)> {
    let status = state
        .profile_service
        .request_author_role(auth.user_id)
        .await?;
    Ok((StatusCode::OK, Json(AuthorRequestDto::from(status))))
}

#[utoipa::path(
    get,
    path = "/api/profile/author-request",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Current request status", body = AuthorRequestDto),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn author_request_status(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> AppResult<(StatusCode, Json<AuthorRequestDto>)> {
    let status = state.profile_service.request_status(auth.user_id).await?;
    Ok((StatusCode::OK, Json(AuthorRequestDto::from(status))))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::ProfileDto;
    use crate::application::profile_service::ProfileView;
    use crate::data::user_repository::UserAccount;
    use crate::domain::activity::{Activity, ActivityKind};
    use crate::domain::comment::{Comment, CommentStatus};
    use crate::domain::post::{Post, PostStatus};
    use crate::domain::profile::{Profile, Role};
    use crate::domain::user::User;

    fn view() -> ProfileView {
        let joined = Utc::now() - Duration::days(30);
        let now = Utc::now();
        let user = User::new(7, "writer", "writer@example.com", false, joined)
            .expect("valid user")
            .with_names("Ada", "Lovelace");
        let profile = Profile {
            user_id: 7,
            role: Role::Author,
            author_request_pending: false,
            bio: String::new(),
            website: String::new(),
            created_at: joined,
            updated_at: now,
        };
        ProfileView {
            account: UserAccount { user, profile },
            posts: vec![Post {
                id: 3,
                title: "Draft".to_string(),
                slug: "draft".to_string(),
                excerpt: String::new(),
                content: "body".to_string(),
                author_id: 7,
                category_id: None,
                tag_ids: Vec::new(),
                status: PostStatus::Draft,
                views_count: 0,
                created_at: now,
                updated_at: now,
                published_at: None,
            }],
            comments: vec![Comment {
                id: 9,
                post_id: 4,
                user_id: 7,
                content: "pending remark".to_string(),
                status: CommentStatus::Pending,
                created_at: now,
                updated_at: now,
            }],
            recent_activity: vec![Activity {
                id: 11,
                user_id: 7,
                kind: ActivityKind::Login,
                post_id: None,
                ip_address: None,
                user_agent: "tests".to_string(),
                created_at: now,
            }],
        }
    }

    #[test]
    fn profile_dto_carries_names_content_and_timestamps() {
        let view = view();
        let joined = view.account.profile.created_at;
        let dto = ProfileDto::from(view);

        assert_eq!(dto.user.first_name, "Ada");
        assert_eq!(dto.user.last_name, "Lovelace");
        assert_eq!(dto.profile_created_at, joined);
        assert!(dto.profile_updated_at > dto.profile_created_at);
        assert_eq!(dto.posts.len(), 1);
        assert_eq!(dto.posts[0].slug, "draft");
        assert_eq!(dto.comments.len(), 1);
        assert_eq!(dto.comments[0].id, 9);
        assert_eq!(dto.recent_activity[0].user_id, 7);
    }
}
