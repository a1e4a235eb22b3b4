use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::slug::resolve_slug;

pub(crate) const TITLE_MIN_CHARS: usize = 3;
pub(crate) const TITLE_MAX_CHARS: usize = 200;
pub(crate) const CONTENT_MIN_CHARS: usize = 50;
pub(crate) const EXCERPT_MAX_CHARS: usize = 300;
pub(crate) const SLUG_MAX_LEN: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            _ => Err(DomainError::Validation {
                field: "status",
                message: "must be 'draft' or 'published'",
            }),
        }
    }
}

/// Status change produced by a save. `from` is `None` when the post is new.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatusTransition {
    pub(crate) from: Option<PostStatus>,
    pub(crate) to: PostStatus,
}

impl StatusTransition {
    pub(crate) fn created(to: PostStatus) -> Self {
        Self { from: None, to }
    }

    /// True when the save moved the post into `published`.
    pub(crate) fn publishes(&self) -> bool {
        self.to == PostStatus::Published && self.from != Some(PostStatus::Published)
    }
}

/// `published_at` for a post saved with `status`: kept if already stamped,
/// stamped with `now` on the first publish, cleared on draft.
pub(crate) fn publication_stamp(
    status: PostStatus,
    current: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match status {
        PostStatus::Published => Some(current.unwrap_or(now)),
        PostStatus::Draft => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) slug: String,
    pub(crate) excerpt: String,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Vec<i64>,
    pub(crate) status: PostStatus,
    pub(crate) views_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) published_at: Option<DateTime<Utc>>,
}

impl Post {
    pub(crate) fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    pub(crate) fn set_status(&mut self, status: PostStatus, now: DateTime<Utc>) -> StatusTransition {
        let from = self.status;
        self.status = status;
        self.published_at = publication_stamp(status, self.published_at, now);
        StatusTransition {
            from: Some(from),
            to: status,
        }
    }

    /// Applies an already validated update. The slug is left untouched.
    pub(crate) fn apply_update(
        &mut self,
        req: UpdatePostRequest,
        now: DateTime<Utc>,
    ) -> StatusTransition {
        self.title = req.title;
        self.excerpt = req.excerpt;
        self.content = req.content;
        self.category_id = req.category_id;
        self.tag_ids = req.tag_ids;
        self.updated_at = now;
        let status = req.status.unwrap_or(self.status);
        self.set_status(status, now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    /// Empty means "derive from the title".
    pub(crate) slug: String,
    pub(crate) excerpt: String,
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Vec<i64>,
    pub(crate) status: PostStatus,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = normalize_title(&self.title)?;
        let slug = resolve_slug(Some(&self.slug), &title, SLUG_MAX_LEN)?;
        Ok(Self {
            slug,
            title,
            excerpt: normalize_excerpt(&self.excerpt)?,
            content: normalize_content(&self.content)?,
            category_id: validate_optional_id("category_id", self.category_id)?,
            tag_ids: normalize_tag_ids(self.tag_ids)?,
            status: self.status,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) excerpt: String,
    pub(crate) content: String,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_ids: Vec<i64>,
    /// `None` keeps the current status.
    pub(crate) status: Option<PostStatus>,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            title: normalize_title(&self.title)?,
            excerpt: normalize_excerpt(&self.excerpt)?,
            content: normalize_content(&self.content)?,
            category_id: validate_optional_id("category_id", self.category_id)?,
            tag_ids: normalize_tag_ids(self.tag_ids)?,
            status: self.status,
        })
    }
}

/// Filters for the published-post search.
#[derive(Debug, Clone, Default)]
pub(crate) struct PostSearch {
    pub(crate) query: Option<String>,
    pub(crate) category_id: Option<i64>,
    pub(crate) tag_id: Option<i64>,
}

impl PostSearch {
    pub(crate) fn normalize(self) -> Result<Self, DomainError> {
        let query = self
            .query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if query.as_ref().is_some_and(|q| q.chars().count() > 100) {
            return Err(DomainError::Validation {
                field: "query",
                message: "must be at most 100 chars",
            });
        }
        Ok(Self {
            query,
            category_id: validate_optional_id("category", self.category_id)?,
            tag_id: validate_optional_id("tag", self.tag_id)?,
        })
    }
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    let len = title.chars().count();
    if !(TITLE_MIN_CHARS..=TITLE_MAX_CHARS).contains(&len) {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 3..200 chars",
        });
    }
    Ok(title.to_string())
}

fn normalize_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.chars().count() < CONTENT_MIN_CHARS {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be at least 50 chars",
        });
    }
    Ok(content.to_string())
}

fn normalize_excerpt(excerpt: &str) -> Result<String, DomainError> {
    let excerpt = excerpt.trim();
    if excerpt.chars().count() > EXCERPT_MAX_CHARS {
        return Err(DomainError::Validation {
            field: "excerpt",
            message: "must be at most 300 chars",
        });
    }
    Ok(excerpt.to_string())
}

fn validate_optional_id(field: &'static str, value: Option<i64>) -> Result<Option<i64>, DomainError> {
    match value {
        Some(id) if id <= 0 => Err(DomainError::Validation {
            field,
            message: "must be > 0",
        }),
        other => Ok(other),
    }
}

fn normalize_tag_ids(mut tag_ids: Vec<i64>) -> Result<Vec<i64>, DomainError> {
    if tag_ids.iter().any(|id| *id <= 0) {
        return Err(DomainError::Validation {
            field: "tag_ids",
            message: "must all be > 0",
        });
    }
    tag_ids.sort_unstable();
    tag_ids.dedup();
    Ok(tag_ids)
}
