use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ActivityKind {
    ViewPost,
    CreatePost,
    EditPost,
    DeletePost,
    CommentPost,
    Login,
    Logout,
}

impl ActivityKind {
    pub(crate) const ALL: [ActivityKind; 7] = [
        ActivityKind::ViewPost,
        ActivityKind::CreatePost,
        ActivityKind::EditPost,
        ActivityKind::DeletePost,
        ActivityKind::CommentPost,
        ActivityKind::Login,
        ActivityKind::Logout,
    ];

    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ActivityKind::ViewPost => "view_post",
            ActivityKind::CreatePost => "create_post",
            ActivityKind::EditPost => "edit_post",
            ActivityKind::DeletePost => "delete_post",
            ActivityKind::CommentPost => "comment_post",
            ActivityKind::Login => "login",
            ActivityKind::Logout => "logout",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActivityKind {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| DomainError::Unexpected(format!("unknown activity type: {value}")))
    }
}

/// Where a request came from, as recorded in the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ClientInfo {
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: String,
}

impl ClientInfo {
    pub(crate) fn new(
        forwarded_for: Option<&str>,
        peer: Option<IpAddr>,
        user_agent: Option<&str>,
    ) -> Self {
        Self {
            ip_address: client_ip(forwarded_for, peer),
            user_agent: user_agent.unwrap_or_default().to_string(),
        }
    }
}

/// First hop of `X-Forwarded-For` when present, otherwise the peer address.
pub(crate) fn client_ip(forwarded_for: Option<&str>, peer: Option<IpAddr>) -> Option<String> {
    forwarded_for
        .and_then(|raw| raw.split(',').next())
        .map(str::trim)
        .filter(|first| !first.is_empty())
        .map(str::to_string)
        .or_else(|| peer.map(|ip| ip.to_string()))
}

#[derive(Debug, Clone)]
pub(crate) struct NewActivity {
    pub(crate) user_id: i64,
    pub(crate) kind: ActivityKind,
    pub(crate) post_id: Option<i64>,
    pub(crate) client: ClientInfo,
}

impl NewActivity {
    pub(crate) fn new(user_id: i64, kind: ActivityKind, client: &ClientInfo) -> Self {
        Self {
            user_id,
            kind,
            post_id: None,
            client: client.clone(),
        }
    }

    pub(crate) fn on_post(mut self, post_id: i64) -> Self {
        self.post_id = Some(post_id);
        self
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Activity {
    pub(crate) id: i64,
    pub(crate) user_id: i64,
    pub(crate) kind: ActivityKind,
    pub(crate) post_id: Option<i64>,
    pub(crate) ip_address: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) created_at: DateTime<Utc>,
}
