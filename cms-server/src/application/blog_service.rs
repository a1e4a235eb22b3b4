use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::application::publication::PublicationHook;
use crate::data::activity_repository::ActivityRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{NewPost, Pagination, PostRepository};
use crate::domain::activity::{ActivityKind, ClientInfo, NewActivity};
use crate::domain::authz::{Action, Actor, Resource, can, ensure};
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::post::{
    CreatePostRequest, Post, PostSearch, PostStatus, StatusTransition, UpdatePostRequest,
    publication_stamp,
};

const POPULAR_POSTS: i64 = 5;
const RELATED_POSTS: i64 = 3;

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

/// Everything the post page shows.
#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
    pub(crate) related: Vec<Post>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct AuthorStats {
    pub(crate) total_posts: i64,
    pub(crate) published_posts: i64,
    pub(crate) draft_posts: i64,
    pub(crate) total_comments: i64,
    pub(crate) total_views: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct AuthorDashboard {
    pub(crate) posts: Vec<Post>,
    pub(crate) stats: AuthorStats,
}

pub(crate) struct BlogService<P: PostRepository, C: CommentRepository, A: ActivityRepository> {
    posts: P,
    comments: C,
    activity: A,
    hook: Arc<dyn PublicationHook>,
}

impl<P: PostRepository, C: CommentRepository, A: ActivityRepository> BlogService<P, C, A> {
    pub(crate) fn new(posts: P, comments: C, activity: A, hook: Arc<dyn PublicationHook>) -> Self {
        Self {
            posts,
            comments,
            activity,
            hook,
        }
    }

    pub(crate) async fn create_post(
        &self,
        actor: &Actor,
        req: CreatePostRequest,
        client: &ClientInfo,
    ) -> Result<Post, DomainError> {
        ensure(actor, Action::CreatePost, Resource::None)?;
        let req = req.validate()?;

        let new_post = NewPost {
            published_at: publication_stamp(req.status, None, Utc::now()),
            title: req.title,
            slug: req.slug,
            excerpt: req.excerpt,
            content: req.content,
            author_id: actor.user_id,
            category_id: req.category_id,
            tag_ids: req.tag_ids,
            status: req.status,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, slug = %post.slug, status = %post.status, "post created");

        self.activity
            .record(NewActivity::new(actor.user_id, ActivityKind::CreatePost, client).on_post(post.id))
            .await?;
        self.hook
            .after_save(&post, StatusTransition::created(post.status))
            .await;

        Ok(post)
    }

    /// Drafts are reported as missing to anyone who may not see them.
    /// Every successful load bumps the view counter.
    pub(crate) async fn view_post(
        &self,
        viewer: Option<&Actor>,
        slug: &str,
        client: &ClientInfo,
    ) -> Result<PostDetail, DomainError> {
        let mut post = self.find_by_slug(slug).await?;
        if !post.is_published() {
            let visible = viewer
                .is_some_and(|actor| can(actor, Action::ViewDraft, Resource::post(&post)));
            if !visible {
                return Err(DomainError::NotFound(format!("post slug: {slug}")));
            }
        }

        post.views_count = self
            .posts
            .increment_views(post.id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))?;

        if let Some(actor) = viewer {
            self.activity
                .record(NewActivity::new(actor.user_id, ActivityKind::ViewPost, client).on_post(post.id))
                .await?;
        }

        let comments = self
            .comments
            .list_for_post(post.id, Some(CommentStatus::Approved))
            .await?;
        let related = self.posts.related_posts(&post, RELATED_POSTS).await?;

        Ok(PostDetail {
            post,
            comments,
            related,
        })
    }

    pub(crate) async fn update_post(
        &self,
        actor: &Actor,
        slug: &str,
        req: UpdatePostRequest,
        client: &ClientInfo,
    ) -> Result<Post, DomainError> {
        let mut post = self.find_by_slug(slug).await?;
        ensure(actor, Action::EditPost, Resource::post(&post))?;
        let req = req.validate()?;

        let transition = post.apply_update(req, Utc::now());
        let post = self
            .posts
            .update_post(&post)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))?;
        if transition.from != Some(transition.to) {
            info!(post_id = post.id, from = ?transition.from, to = %transition.to, "post status changed");
        }

        self.activity
            .record(NewActivity::new(actor.user_id, ActivityKind::EditPost, client).on_post(post.id))
            .await?;
        self.hook.after_save(&post, transition).await;

        Ok(post)
    }

    /// The activity entry is written first; its post reference is cleared
    /// once the post is gone.
    pub(crate) async fn delete_post(
        &self,
        actor: &Actor,
        slug: &str,
        client: &ClientInfo,
    ) -> Result<(), DomainError> {
        let post = self.find_by_slug(slug).await?;
        ensure(actor, Action::DeletePost, Resource::post(&post))?;

        self.activity
            .record(NewActivity::new(actor.user_id, ActivityKind::DeletePost, client).on_post(post.id))
            .await?;

        let deleted = self.posts.delete_post(post.id).await?;
        if !deleted {
            return Err(DomainError::NotFound(format!("post slug: {slug}")));
        }
        info!(post_id = post.id, "post deleted");
        Ok(())
    }

    pub(crate) async fn list_posts(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        self.search_posts(PostSearch::default(), page, page_size).await
    }

    pub(crate) async fn search_posts(
        &self,
        search: PostSearch,
        page: u32,
        page_size: u32,
    ) -> Result<ListPostsResult, DomainError> {
        let search = search.normalize()?;
        let pagination = Pagination { page, page_size };
        let posts = self.posts.list_published(&search, pagination).await?;
        let total = self.posts.count_published(&search).await?;

        Ok(ListPostsResult {
            posts,
            page,
            page_size,
            total,
        })
    }

    pub(crate) async fn popular_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.popular_posts(POPULAR_POSTS).await
    }

    pub(crate) async fn dashboard(&self, actor: &Actor) -> Result<AuthorDashboard, DomainError> {
        if !actor.is_author() {
            return Err(DomainError::Forbidden);
        }

        let posts = self.posts.list_by_author(actor.user_id).await?;
        let total_comments = self.comments.count_for_author(actor.user_id).await?;
        let published_posts = posts
            .iter()
            .filter(|post| post.status == PostStatus::Published)
            .count() as i64;
        let total_posts = posts.len() as i64;
        let stats = AuthorStats {
            total_posts,
            published_posts,
            draft_posts: total_posts - published_posts,
            total_comments,
            total_views: posts.iter().map(|post| post.views_count).sum(),
        };

        Ok(AuthorDashboard { posts, stats })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .get_post_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))
    }
}
