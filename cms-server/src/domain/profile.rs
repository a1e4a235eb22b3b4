use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateUrl;

use super::error::DomainError;
use super::user::{normalize_email, normalize_first_name, normalize_last_name};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Role {
    Reader,
    Author,
    Admin,
}

impl Role {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Role::Reader => "reader",
            Role::Author => "author",
            Role::Admin => "admin",
        }
    }

    /// Authors and admins may publish.
    pub(crate) fn is_author(self) -> bool {
        matches!(self, Role::Author | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "reader" => Ok(Role::Reader),
            "author" => Ok(Role::Author),
            "admin" => Ok(Role::Admin),
            other => Err(DomainError::Unexpected(format!("unknown role: {other}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum AuthorRequestStatus {
    Approved,
    Pending,
    #[serde(rename = "none")]
    NotRequested,
}

impl AuthorRequestStatus {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            AuthorRequestStatus::Approved => "approved",
            AuthorRequestStatus::Pending => "pending",
            AuthorRequestStatus::NotRequested => "none",
        }
    }
}

/// Result of a single author-request transition. `Unchanged` means the
/// profile was already in a state where the transition does not apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestOutcome {
    Changed,
    Unchanged,
}

/// The three author-request transitions a profile can go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RequestTransition {
    Request,
    Approve,
    Reject,
}

impl RequestTransition {
    pub(crate) fn apply(self, profile: &mut Profile) -> RequestOutcome {
        match self {
            RequestTransition::Request => profile.request_author_role(),
            RequestTransition::Approve => profile.approve_author_request(),
            RequestTransition::Reject => profile.reject_author_request(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub(crate) user_id: i64,
    pub(crate) role: Role,
    pub(crate) author_request_pending: bool,
    pub(crate) bio: String,
    pub(crate) website: String,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Profile {
    pub(crate) fn is_author(&self) -> bool {
        self.role.is_author()
    }

    pub(crate) fn request_status(&self) -> AuthorRequestStatus {
        if self.is_author() {
            AuthorRequestStatus::Approved
        } else if self.author_request_pending {
            AuthorRequestStatus::Pending
        } else {
            AuthorRequestStatus::NotRequested
        }
    }

    /// reader -> reader+pending. Authors, admins and readers that already
    /// asked are left alone.
    pub(crate) fn request_author_role(&mut self) -> RequestOutcome {
        if self.is_author() || self.author_request_pending {
            return RequestOutcome::Unchanged;
        }
        self.author_request_pending = true;
        RequestOutcome::Changed
    }

    /// reader+pending -> author. A profile whose role is no longer `reader`
    /// keeps both its role and its (stale) pending flag.
    pub(crate) fn approve_author_request(&mut self) -> RequestOutcome {
        if !self.author_request_pending || self.role != Role::Reader {
            return RequestOutcome::Unchanged;
        }
        self.role = Role::Author;
        self.author_request_pending = false;
        RequestOutcome::Changed
    }

    /// Clears the pending flag; the role is never touched.
    pub(crate) fn reject_author_request(&mut self) -> RequestOutcome {
        if !self.author_request_pending {
            return RequestOutcome::Unchanged;
        }
        self.author_request_pending = false;
        RequestOutcome::Changed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdateProfileRequest {
    pub(crate) email: String,
    #[serde(default)]
    pub(crate) first_name: String,
    #[serde(default)]
    pub(crate) last_name: String,
    pub(crate) bio: String,
    pub(crate) website: String,
}

impl UpdateProfileRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let email = normalize_email(&self.email)?;
        let first_name = normalize_first_name(&self.first_name)?;
        let last_name = normalize_last_name(&self.last_name)?;
        let bio = self.bio.trim().to_string();
        if bio.chars().count() > 2000 {
            return Err(DomainError::Validation {
                field: "bio",
                message: "must be at most 2000 chars",
            });
        }
        let website = self.website.trim().to_string();
        if !website.is_empty() && !website.validate_url() {
            return Err(DomainError::Validation {
                field: "website",
                message: "must be a valid URL",
            });
        }
        Ok(Self {
            email,
            first_name,
            last_name,
            bio,
            website,
        })
    }
}
