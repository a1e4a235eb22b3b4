use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::taxonomy::{Category, CreateCategoryRequest, CreateTagRequest, Tag, TagUsage};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::posts::{ListPostsResponseDto, PaginationQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) description: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Category> for CategoryDto {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
            description: category.description,
            created_at: category.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagDto {
    pub(crate) id: i64,
    pub(crate) name: String,
    pub(crate) slug: String,
    pub(crate) created_at: DateTime<Utc>,
}

impl From<Tag> for TagDto {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
            created_at: tag.created_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagUsageDto {
    pub(crate) tag: TagDto,
    pub(crate) post_count: i64,
}

impl From<TagUsage> for TagUsageDto {
    fn from(usage: TagUsage) -> Self {
        Self {
            tag: usage.tag.into(),
            post_count: usage.post_count,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryPostsDto {
    pub(crate) category: CategoryDto,
    #[serde(flatten)]
    pub(crate) page: ListPostsResponseDto,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct TagPostsDto {
    pub(crate) tag: TagDto,
    #[serde(flatten)]
    pub(crate) page: ListPostsResponseDto,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateCategoryDto {
    #[validate(length(min = 1, max = 100))]
    pub(crate) name: String,
    /// Derived from the name when omitted.
    #[validate(length(max = 100))]
    pub(crate) slug: Option<String>,
    pub(crate) description: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreateTagDto {
    #[validate(length(min = 1, max = 50))]
    pub(crate) name: String,
    #[validate(length(max = 50))]
    pub(crate) slug: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "taxonomy",
    responses(
        (status = 200, description = "All categories by name", body = [CategoryDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_categories(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<CategoryDto>>)> {
    let categories = state.taxonomy_service.categories().await?;
    Ok((
        StatusCode::OK,
        Json(categories.into_iter().map(CategoryDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/tags/popular",
    tag = "taxonomy",
    responses(
        (status = 200, description = "Most used tags", body = [TagUsageDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn popular_tags(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<TagUsageDto>>)> {
    let tags = state.taxonomy_service.popular_tags().await?;
    Ok((
        StatusCode::OK,
        Json(tags.into_iter().map(TagUsageDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/categories/{slug}/posts",
    tag = "taxonomy",
    params(
        ("slug" = String, Path, description = "Category slug"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Published posts in the category", body = CategoryPostsDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<CategoryPostsDto>)> {
    query.validate()?;
    let (page, page_size) = query.page();

    let (category, result) = state
        .taxonomy_service
        .posts_in_category(&slug, page, page_size)
        .await?;
    Ok((
        StatusCode::OK,
        Json(CategoryPostsDto {
            category: category.into(),
            page: result.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/tags/{slug}/posts",
    tag = "taxonomy",
    params(
        ("slug" = String, Path, description = "Tag slug"),
        PaginationQuery
    ),
    responses(
        (status = 200, description = "Published posts with the tag", body = TagPostsDto),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn tag_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<TagPostsDto>)> {
    query.validate()?;
    let (page, page_size) = query.page();

    let (tag, result) = state
        .taxonomy_service
        .posts_with_tag(&slug, page, page_size)
        .await?;
    Ok((
        StatusCode::OK,
        Json(TagPostsDto {
            tag: tag.into(),
            page: result.into(),
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/admin/categories",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCategoryDto,
    responses(
        (status = 201, description = "Category created", body = CategoryDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Name or slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_category(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateCategoryDto>,
) -> AppResult<(StatusCode, Json<CategoryDto>)> {
    dto.validate()?;
    let req = CreateCategoryRequest {
        name: dto.name,
        slug: dto.slug.unwrap_or_default(),
        description: dto.description.unwrap_or_default(),
    };

    let category = state
        .taxonomy_service
        .create_category(&auth.actor, req)
        .await?;
    Ok((StatusCode::CREATED, Json(CategoryDto::from(category))))
}

#[utoipa::path(
    post,
    path = "/api/admin/tags",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateTagDto,
    responses(
        (status = 201, description = "Tag created", body = TagDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Staff only"),
        (status = 409, description = "Name or slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_tag(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<CreateTagDto>,
) -> AppResult<(StatusCode, Json<TagDto>)> {
    dto.validate()?;
    let req = CreateTagRequest {
        name: dto.name,
        slug: dto.slug.unwrap_or_default(),
    };

    let tag = state.taxonomy_service.create_tag(&auth.actor, req).await?;
    Ok((StatusCode::CREATED, Json(TagDto::from(tag))))
}
