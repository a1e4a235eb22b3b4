use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::data::user_repository::UserAccount;
use crate::domain::activity::ClientInfo;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 8, max = 128))]
    pub(crate) password: String,
    #[validate(length(max = 30))]
    pub(crate) first_name: Option<String>,
    #[validate(length(max = 150))]
    pub(crate) last_name: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    /// Username or e-mail address.
    #[validate(length(min = 1, max = 255))]
    pub(crate) login: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct AuthResponseDto {
    pub(crate) access_token: String,
    pub(crate) user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) is_staff: bool,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    /// `reader`, `author` or `admin`.
    pub(crate) role: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<&UserAccount> for UserDto {
    fn from(account: &UserAccount) -> Self {
        Self {
            id: account.user.id,
            username: account.user.username.clone(),
            email: account.user.email.clone(),
            is_staff: account.user.is_staff,
            first_name: account.user.first_name.clone(),
            last_name: account.user.last_name.clone(),
            role: account.profile.role.as_str().to_string(),
            created_at: account.user.created_at,
        }
    }
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            user: UserDto::from(&result.account),
            access_token: result.access_token,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "User already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    Json(dto): Json<RegisterDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = RegisterRequest {
        username: dto.username,
        email: dto.email,
        password: dto.password,
        first_name: dto.first_name.unwrap_or_default(),
        last_name: dto.last_name.unwrap_or_default(),
    };

    let result = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(AuthResponseDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    Json(dto): Json<LoginDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = LoginRequest {
        login: dto.login,
        password: dto.password,
    };

    let result = state.auth_service.login(req, &client).await?;

    Ok((StatusCode::OK, Json(AuthResponseDto::from(result))))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Logged out"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn logout(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    client: ClientInfo,
) -> AppResult<StatusCode> {
    state.auth_service.logout(auth.user_id, &client).await?;
    Ok(StatusCode::NO_CONTENT)
}
