use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::domain::post::{Post, StatusTransition};

#[derive(Debug, Error)]
pub(crate) enum NotificationError {
    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[async_trait]
pub(crate) trait NotificationSender: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str)
    -> Result<(), NotificationError>;
}

/// Runs after a post save has been committed.
#[async_trait]
pub(crate) trait PublicationHook: Send + Sync {
    async fn after_save(&self, post: &Post, transition: StatusTransition);
}

/// Sends a "New Post Published" message when a save moves a post into
/// `published`. Delivery failures never fail the save.
pub(crate) struct NotifyOnPublish<S: NotificationSender> {
    sender: S,
    recipient: Option<String>,
}

impl<S: NotificationSender> NotifyOnPublish<S> {
    pub(crate) fn new(sender: S, recipient: Option<String>) -> Self {
        Self { sender, recipient }
    }
}

#[async_trait]
impl<S: NotificationSender> PublicationHook for NotifyOnPublish<S> {
    async fn after_save(&self, post: &Post, transition: StatusTransition) {
        if !transition.publishes() {
            return;
        }
        let Some(recipient) = self.recipient.as_deref() else {
            debug!(post_id = post.id, "no notification recipient configured");
            return;
        };

        let subject = format!("New Post Published: {}", post.title);
        let body = format!("New post published: {} (/api/posts/{})", post.title, post.slug);
        if let Err(err) = self.sender.send(recipient, &subject, &body).await {
            warn!(post_id = post.id, error = %err, "publish notification failed");
        }
    }
}
