//! Single authorization predicate for every mutating (and draft-reading)
//! operation. Callers pass who is acting, what they want to do and on what.

use super::comment::Comment;
use super::error::DomainError;
use super::post::Post;
use super::profile::{Profile, Role};
use super::user::User;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Actor {
    pub(crate) user_id: i64,
    pub(crate) is_staff: bool,
    pub(crate) role: Role,
    pub(crate) author_request_pending: bool,
}

impl Actor {
    pub(crate) fn new(user: &User, profile: &Profile) -> Self {
        Self {
            user_id: user.id,
            is_staff: user.is_staff,
            role: profile.role,
            author_request_pending: profile.author_request_pending,
        }
    }

    pub(crate) fn is_author(&self) -> bool {
        self.role.is_author()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    CreatePost,
    EditPost,
    DeletePost,
    ViewDraft,
    ModerateComment,
    DeleteComment,
    ModerateCommentsInBulk,
    ManageAuthorRequests,
    ManageTaxonomy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resource {
    None,
    Post {
        author_id: i64,
    },
    Comment {
        post_author_id: i64,
        comment_user_id: i64,
    },
}

impl Resource {
    pub(crate) fn post(post: &Post) -> Self {
        Resource::Post {
            author_id: post.author_id,
        }
    }

    pub(crate) fn comment(comment: &Comment, post_author_id: i64) -> Self {
        Resource::Comment {
            post_author_id,
            comment_user_id: comment.user_id,
        }
    }
}

pub(crate) fn can(actor: &Actor, action: Action, resource: Resource) -> bool {
    match (action, resource) {
        (Action::CreatePost, Resource::None) => actor.is_author(),
        (Action::EditPost | Action::DeletePost | Action::ViewDraft, Resource::Post { author_id }) => {
            actor.user_id == author_id || actor.is_staff
        }
        (Action::ModerateComment, Resource::Post { author_id }) => {
            actor.user_id == author_id || actor.is_staff
        }
        (Action::ModerateComment, Resource::Comment { post_author_id, .. }) => {
            actor.user_id == post_author_id || actor.is_staff
        }
        (
            Action::DeleteComment,
            Resource::Comment {
                post_author_id,
                comment_user_id,
            },
        ) => actor.user_id == comment_user_id || actor.user_id == post_author_id || actor.is_staff,
        (
            Action::ModerateCommentsInBulk | Action::ManageAuthorRequests | Action::ManageTaxonomy,
            Resource::None,
        ) => actor.is_staff,
        _ => false,
    }
}

/// `can` as a `Result`. A reader trying to create a post gets
/// `AuthorRoleRequired` so the caller can steer them to the request flow.
pub(crate) fn ensure(actor: &Actor, action: Action, resource: Resource) -> Result<(), DomainError> {
    if can(actor, action, resource) {
        return Ok(());
    }
    match action {
        Action::CreatePost => Err(DomainError::AuthorRoleRequired {
            request_pending: actor.author_request_pending,
        }),
        _ => Err(DomainError::Forbidden),
    }
}
