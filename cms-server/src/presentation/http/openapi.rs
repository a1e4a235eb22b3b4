use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::activity::{
    ActivityCountDto, ActivityDto, ActivityQuery, ActivitySummaryDto,
};
use crate::presentation::http::handlers::admin::{BulkResultDto, SelectionDto};
use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::http::handlers::comments::{CommentDto, CreateCommentDto};
use crate::presentation::http::handlers::dashboard::{AuthorStatsDto, DashboardDto};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::posts::{
    CreatePostDto, ListPostsResponseDto, PaginationQuery, PostDetailDto, PostDto, PostStatusDto,
    SearchQuery, UpdatePostDto,
};
use crate::presentation::http::handlers::profile::{
    AuthorRequestDto, ProfileDto, UpdateProfileDto,
};
use crate::presentation::http::handlers::taxonomy::{
    CategoryDto, CategoryPostsDto, CreateCategoryDto, CreateTagDto, TagDto, TagPostsDto,
    TagUsageDto,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::logout,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::popular_posts,
        crate::presentation::http::handlers::posts::search_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::moderation_queue,
        crate::presentation::http::handlers::comments::approve_comment,
        crate::presentation::http::handlers::comments::reject_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::taxonomy::list_categories,
        crate::presentation::http::handlers::taxonomy::category_posts,
        crate::presentation::http::handlers::taxonomy::popular_tags,
        crate::presentation::http::handlers::taxonomy::tag_posts,
        crate::presentation::http::handlers::taxonomy::create_category,
        crate::presentation::http::handlers::taxonomy::create_tag,
        crate::presentation::http::handlers::profile::get_profile,
        crate::presentation::http::handlers::profile::update_profile,
        crate::presentation::http::handlers::profile::request_author,
        crate::presentation::http::handlers::profile::author_request_status,
        crate::presentation::http::handlers::dashboard::dashboard,
        crate::presentation::http::handlers::activity::recent_activity,
        crate::presentation::http::handlers::activity::activity_summary,
        crate::presentation::http::handlers::admin::list_author_requests,
        crate::presentation::http::handlers::admin::approve_author_requests,
        crate::presentation::http::handlers::admin::reject_author_requests,
        crate::presentation::http::handlers::admin::approve_comments,
        crate::presentation::http::handlers::admin::reject_comments
    ),
    components(
        schemas(
            HealthzResponse,
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PostStatusDto,
            CreatePostDto,
            UpdatePostDto,
            PaginationQuery,
            SearchQuery,
            PostDto,
            PostDetailDto,
            ListPostsResponseDto,
            CommentDto,
            CreateCommentDto,
            CategoryDto,
            CategoryPostsDto,
            TagDto,
            TagPostsDto,
            TagUsageDto,
            CreateCategoryDto,
            CreateTagDto,
            ProfileDto,
            UpdateProfileDto,
            AuthorRequestDto,
            DashboardDto,
            AuthorStatsDto,
            ActivityDto,
            ActivityQuery,
            ActivityCountDto,
            ActivitySummaryDto,
            SelectionDto,
            BulkResultDto
        )
    ),
    tags(
        (name = "health", description = "Liveness check"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "posts", description = "Post endpoints"),
        (name = "comments", description = "Comment and moderation endpoints"),
        (name = "taxonomy", description = "Categories and tags"),
        (name = "profile", description = "Own profile and author-role requests"),
        (name = "dashboard", description = "Author dashboard"),
        (name = "activity", description = "Own activity log"),
        (name = "admin", description = "Staff-only endpoints")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
