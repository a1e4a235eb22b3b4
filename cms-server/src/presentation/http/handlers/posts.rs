use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::blog_service::{ListPostsResult, PostDetail};
use crate::domain::activity::ClientInfo;
use crate::domain::post::{CreatePostRequest, Post, PostSearch, PostStatus, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::handlers::comments::CommentDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatusDto {
    Draft,
    Published,
}

impl From<PostStatusDto> for PostStatus {
    fn from(status: PostStatusDto) -> Self {
        match status {
            PostStatusDto::Draft => PostStatus::Draft,
            PostStatusDto::Published => PostStatus::Published,
        }
    }
}

impl From<PostStatus> for PostStatusDto {
    fn from(status: PostStatus) -> Self {
        match status {
            PostStatus::Draft => PostStatusDto::Draft,
            PostStatus::Published => PostStatusDto::Published,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 3, max = 200))]
    pub(crate) title: String,
    /// Derived from the title when omitted.
    #[validate(length(max = 200))]
    pub(crate) slug: Option<String>,
    #[validate(length(max = 300))]
    pub(crate) excerpt: Option<String>,
    #[validate(length(min = 50))]
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Option<Vec<i64>>,
    /// Defaults to `draft`.
    pub(crate) status: Option<PostStatusDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 3, max = 200))]
    pub(crate) title: String,
    #[validate(length(max = 300))]
    pub(crate) excerpt: Option<String>,
    #[validate(length(min = 50))]
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Option<Vec<i64>>,
    /// Keeps the current status when omitted.
    pub(crate) status: Option<PostStatusDto>,
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct PaginationQuery {
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

impl PaginationQuery {
    /// `(page, page_size)` for the services.
    pub(crate) fn page(&self) -> (u32, u32) {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0);
        ((offset / limit) + 1, limit)
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct SearchQuery {
    /// Case-insensitive substring of title, content or excerpt.
    #[validate(length(max = 100))]
    pub(crate) q: Option<String>,
    pub(crate) category: Option<i64>,
    pub(crate) tag: Option<i64>,
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    pub(crate) offset: Option<u32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Vec<i64>,
    pub(crate) status: PostStatusDto,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) limit: u32,
    pub(crate) offset: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    /// Approved comments only.
    pub(crate) comments: Vec<CommentDto>,
    pub(crate) related: Vec<PostDto>,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            slug: post.slug,
            excerpt: post.excerpt,
            content: post.content,
            author_id: post.author_id,
            category_id: post.category_id,
            tag_ids: post.tag_ids,
            status: post.status.into(),
            views_count: post.views_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
            published_at: post.published_at,
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        let offset = result
            .page
            .saturating_sub(1)
            .saturating_mul(result.page_size);
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            limit: result.page_size,
            offset,
            total: result.total,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
            related: detail.related.into_iter().map(PostDto::from).collect(),
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Published posts, newest first", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, page_size) = query.page();

    let result = state.blog_service.list_posts(page, page_size).await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/popular",
    tag = "posts",
    responses(
        (status = 200, description = "Most viewed published posts", body = [PostDto]),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn popular_posts(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<PostDto>>)> {
    let posts = state.blog_service.popular_posts().await?;
    Ok((
        StatusCode::OK,
        Json(posts.into_iter().map(PostDto::from).collect()),
    ))
}

#[utoipa::path(
    get,
    path = "/api/posts/search",
    tag = "posts",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching published posts", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn search_posts(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<(StatusCode, Json<ListPostsResponseDto>)> {
    query.validate()?;
    let (page, page_size) = PaginationQuery {
        limit: query.limit,
        offset: query.offset,
    }
    .page();
    let search = PostSearch {
        query: query.q,
        category_id: query.category,
        tag_id: query.tag,
    };

    let result = state
        .blog_service
        .search_posts(search, page, page_size)
        .await?;

    Ok((StatusCode::OK, Json(ListPostsResponseDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{slug}",
    tag = "posts",
    security(
        (),
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 200, description = "Post with approved comments and related posts", body = PostDetailDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    auth: Option<AuthenticatedUser>,
    client: ClientInfo,
    Path(slug): Path<String>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let viewer = auth.as_ref().map(|user| &user.actor);
    let detail = state.blog_service.view_post(viewer, &slug, &client).await?;

    Ok((StatusCode::OK, Json(PostDetailDto::from(detail))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Author role required"),
        (status = 404, description = "Unknown category or tag"),
        (status = 409, description = "Slug already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    client: ClientInfo,
    Json(dto): Json<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = CreatePostRequest {
        title: dto.title,
        slug: dto.slug.unwrap_or_default(),
        excerpt: dto.excerpt.unwrap_or_default(),
        content: dto.content,
        category_id: dto.category_id,
        tag_ids: dto.tag_ids.unwrap_or_default(),
        status: dto.status.map(PostStatus::from).unwrap_or_default(),
    };

    let result = state
        .blog_service
        .create_post(&auth.actor, req, &client)
        .await?;
    Ok((StatusCode::CREATED, Json(PostDto::from(result))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{slug}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    client: ClientInfo,
    Path(slug): Path<String>,
    Json(dto): Json<UpdatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;
    let req = UpdatePostRequest {
        title: dto.title,
        excerpt: dto.excerpt.unwrap_or_default(),
        content: dto.content,
        category_id: dto.category_id,
        tag_ids: dto.tag_ids.unwrap_or_default(),
        status: dto.status.map(PostStatus::from),
    };

    let result = state
        .blog_service
        .update_post(&auth.actor, &slug, req, &client)
        .await?;
    Ok((StatusCode::OK, Json(PostDto::from(result))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{slug}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("slug" = String, Path, description = "Post slug")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    client: ClientInfo,
    Path(slug): Path<String>,
) -> AppResult<StatusCode> {
    state
        .blog_service
        .delete_post(&auth.actor, &slug, &client)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
