use sqlx::PgPool;
use std::sync::Arc;

use crate::application::activity_service::ActivityService;
use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::application::profile_service::ProfileService;
use crate::application::publication::PublicationHook;
use crate::application::taxonomy_service::TaxonomyService;
use crate::data::repositories::postgres::activity_repository::PostgresActivityRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::taxonomy_repository::PostgresTaxonomyRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;

pub(crate) mod http;

type Users = PostgresUserRepository;
type Posts = PostgresPostRepository;
type Comments = PostgresCommentRepository;
type Taxonomy = PostgresTaxonomyRepository;
type Activities = PostgresActivityRepository;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService<Users, Activities>>,
    pub(crate) blog_service: Arc<BlogService<Posts, Comments, Activities>>,
    pub(crate) comment_service: Arc<CommentService<Comments, Posts, Activities>>,
    pub(crate) profile_service: Arc<ProfileService<Users, Activities, Posts, Comments>>,
    pub(crate) taxonomy_service: Arc<TaxonomyService<Taxonomy, Posts>>,
    pub(crate) activity_service: Arc<ActivityService<Activities>>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    /// Wires every service to Postgres repositories sharing `pool`.
    pub(crate) fn new(
        pool: PgPool,
        jwt: Arc<JwtService>,
        staff_usernames: Vec<String>,
        publication_hook: Arc<dyn PublicationHook>,
    ) -> Self {
        let users = PostgresUserRepository::new(pool.clone());
        let posts = PostgresPostRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool.clone());
        let taxonomy = PostgresTaxonomyRepository::new(pool.clone());
        let activities = PostgresActivityRepository::new(pool);

        Self {
            auth_service: Arc::new(AuthService::new(
                users.clone(),
                activities.clone(),
                jwt.clone(),
                staff_usernames,
            )),
            blog_service: Arc::new(BlogService::new(
                posts.clone(),
                comments.clone(),
                activities.clone(),
                publication_hook,
            )),
            comment_service: Arc::new(CommentService::new(
                comments.clone(),
                posts.clone(),
                activities.clone(),
            )),
            profile_service: Arc::new(ProfileService::new(
                users,
                activities.clone(),
                posts.clone(),
                comments,
            )),
            taxonomy_service: Arc::new(TaxonomyService::new(taxonomy, posts)),
            activity_service: Arc::new(ActivityService::new(activities)),
            jwt,
        }
    }
}
