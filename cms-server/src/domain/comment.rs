use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum CommentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl CommentStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            CommentStatus::Pending => "pending",
            CommentStatus::Approved => "approved",
            CommentStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for CommentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommentStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "pending" => Ok(CommentStatus::Pending),
            "approved" => Ok(CommentStatus::Approved),
            "rejected" => Ok(CommentStatus::Rejected),
            other => Err(DomainError::Unexpected(format!(
                "unknown comment status: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModerationDecision {
    Approve,
    Reject,
}

impl ModerationDecision {
    pub(crate) fn target_status(self) -> CommentStatus {
        match self {
            ModerationDecision::Approve => CommentStatus::Approved,
            ModerationDecision::Reject => CommentStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) user_id: i64,
    pub(crate) content: String,
    pub(crate) status: CommentStatus,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Comment {
    /// Any status may move to any decision, including back out of `rejected`.
    /// Returns the previous status.
    pub(crate) fn moderate(
        &mut self,
        decision: ModerationDecision,
        now: DateTime<Utc>,
    ) -> CommentStatus {
        let previous = self.status;
        self.status = decision.target_status();
        self.updated_at = now;
        previous
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreateCommentRequest {
    pub(crate) content: String,
}

impl CreateCommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let content = self.content.trim();
        let len = content.chars().count();
        if !(2..=5000).contains(&len) {
            return Err(DomainError::Validation {
                field: "content",
                message: "must be 2..5000 chars",
            });
        }
        Ok(Self {
            content: content.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Comment, CommentStatus, CreateCommentRequest, ModerationDecision};

    fn comment(status: CommentStatus) -> Comment {
        Comment {
            id: 1,
            post_id: 2,
            user_id: 3,
            content: "nice post".to_string(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn new_comments_default_to_pending() {
        assert_eq!(CommentStatus::default(), CommentStatus::Pending);
        assert_eq!(comment(CommentStatus::default()).status, CommentStatus::Pending);
    }

    #[test]
    fn moderation_has_no_terminal_state() {
        let mut c = comment(CommentStatus::Rejected);
        let previous = c.moderate(ModerationDecision::Approve, Utc::now());
        assert_eq!(previous, CommentStatus::Rejected);
        assert_eq!(c.status, CommentStatus::Approved);

        let previous = c.moderate(ModerationDecision::Reject, Utc::now());
        assert_eq!(previous, CommentStatus::Approved);
        assert_eq!(c.status, CommentStatus::Rejected);
    }

    #[test]
    fn approving_twice_is_harmless() {
        let mut c = comment(CommentStatus::Approved);
        c.moderate(ModerationDecision::Approve, Utc::now());
        assert_eq!(c.status, CommentStatus::Approved);
    }

    #[test]
    fn create_request_requires_two_chars() {
        let short = CreateCommentRequest {
            content: " a ".to_string(),
        };
        assert!(short.validate().is_err());

        let ok = CreateCommentRequest {
            content: "  ok  ".to_string(),
        };
        assert_eq!(ok.validate().expect("must be valid").content, "ok");
    }
}
