use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSearch, PostStatus};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Vec<i64>,
    pub(crate) status: PostStatus,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Pagination {
    pub(crate) page: u32,
    pub(crate) page_size: u32,
}

impl Pagination {
    pub(crate) fn limit_offset(&self) -> (i64, i64) {
        let limit = i64::from(self.page_size);
        let offset = i64::from(self.page.saturating_sub(1)) * limit;
        (limit, offset)
    }
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError>;
    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError>;
    /// Writes every mutable field of `post` (including its tag set) back.
    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError>;
    async fn delete_post(&self, id: i64) -> Result<bool, DomainError>;
    /// Returns the new counter, `None` if the post is gone.
    async fn increment_views(&self, id: i64) -> Result<Option<i64>, DomainError>;
    async fn list_published(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError>;
    async fn count_published(&self, search: &PostSearch) -> Result<i64, DomainError>;
    async fn popular_posts(&self, limit: i64) -> Result<Vec<Post>, DomainError>;
    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>, DomainError>;
    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError>;
}
