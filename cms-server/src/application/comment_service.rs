use chrono::Utc;
use tracing::info;

use crate::data::activity_repository::ActivityRepository;
use crate::data::comment_repository::{CommentRepository, CommentWithPost, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::activity::{ActivityKind, ClientInfo, NewActivity};
use crate::domain::authz::{Action, Actor, Resource, ensure};
use crate::domain::comment::{Comment, CreateCommentRequest, ModerationDecision};
use crate::domain::error::DomainError;
use crate::domain::post::Post;

pub(crate) struct CommentService<C: CommentRepository, P: PostRepository, A: ActivityRepository> {
    comments: C,
    posts: P,
    activity: A,
}

impl<C: CommentRepository, P: PostRepository, A: ActivityRepository> CommentService<C, P, A> {
    pub(crate) fn new(comments: C, posts: P, activity: A) -> Self {
        Self {
            comments,
            posts,
            activity,
        }
    }

    /// New comments start out pending. Only published posts accept them.
    pub(crate) async fn add_comment(
        &self,
        actor: &Actor,
        slug: &str,
        req: CreateCommentRequest,
        client: &ClientInfo,
    ) -> Result<Comment, DomainError> {
        let post = self.find_post(slug).await?;
        if !post.is_published() {
            return Err(DomainError::NotFound(format!("post slug: {slug}")));
        }
        let req = req.validate()?;

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                user_id: actor.user_id,
                content: req.content,
            })
            .await?;

        self.activity
            .record(NewActivity::new(actor.user_id, ActivityKind::CommentPost, client).on_post(post.id))
            .await?;

        Ok(comment)
    }

    pub(crate) async fn moderate(
        &self,
        actor: &Actor,
        comment_id: i64,
        decision: ModerationDecision,
    ) -> Result<Comment, DomainError> {
        let CommentWithPost {
            mut comment,
            post_author_id,
            ..
        } = self.find_comment(comment_id).await?;
        ensure(
            actor,
            Action::ModerateComment,
            Resource::comment(&comment, post_author_id),
        )?;

        let previous = comment.moderate(decision, Utc::now());
        let comment = self
            .comments
            .save_status(&comment)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))?;
        info!(comment_id, from = %previous, to = %comment.status, "comment moderated");

        Ok(comment)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor: &Actor,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        let found = self.find_comment(comment_id).await?;
        ensure(
            actor,
            Action::DeleteComment,
            Resource::comment(&found.comment, found.post_author_id),
        )?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(DomainError::NotFound(format!("comment id: {comment_id}")));
        }
        Ok(())
    }

    /// Every comment of the post regardless of status, for its author or staff.
    pub(crate) async fn moderation_queue(
        &self,
        actor: &Actor,
        slug: &str,
    ) -> Result<Vec<Comment>, DomainError> {
        let post = self.find_post(slug).await?;
        ensure(actor, Action::ModerateComment, Resource::post(&post))?;
        self.comments.list_for_post(post.id, None).await
    }

    /// Staff-only; returns how many comments were updated.
    pub(crate) async fn moderate_in_bulk(
        &self,
        actor: &Actor,
        comment_ids: &[i64],
        decision: ModerationDecision,
    ) -> Result<u64, DomainError> {
        ensure(actor, Action::ModerateCommentsInBulk, Resource::None)?;
        if comment_ids.is_empty() {
            return Ok(0);
        }

        let updated = self
            .comments
            .set_status_bulk(comment_ids, decision.target_status())
            .await?;
        info!(updated, status = %decision.target_status(), "bulk comment moderation");
        Ok(updated)
    }

    async fn find_post(&self, slug: &str) -> Result<Post, DomainError> {
        self.posts
            .get_post_by_slug(slug)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("post slug: {slug}")))
    }

    async fn find_comment(&self, comment_id: i64) -> Result<CommentWithPost, DomainError> {
        self.comments
            .get_comment(comment_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("comment id: {comment_id}")))
    }
}
