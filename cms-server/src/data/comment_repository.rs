use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) post_id: i64,
    pub(crate) user_id: i64,
    pub(crate) content: String,
}

/// A comment plus the bits of its post the moderation checks need.
#[derive(Debug, Clone)]
pub(crate) struct CommentWithPost {
    pub(crate) comment: Comment,
    pub(crate) post_author_id: i64,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<CommentWithPost>, DomainError>;
    async fn save_status(&self, comment: &Comment) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    /// `status = None` lists every comment of the post.
    async fn list_for_post(
        &self,
        post_id: i64,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, DomainError>;
    /// Every comment written by the user, any status, newest first.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Comment>, DomainError>;
    async fn set_status_bulk(&self, ids: &[i64], status: CommentStatus) -> Result<u64, DomainError>;
    async fn count_for_author(&self, author_id: i64) -> Result<i64, DomainError>;
}
