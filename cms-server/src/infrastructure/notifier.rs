use async_trait::async_trait;
use tracing::info;

use crate::application::publication::{NotificationError, NotificationSender};

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub(crate) struct TracingNotificationSender;

#[async_trait]
impl NotificationSender for TracingNotificationSender {
    async fn send(
        &self,
        recipient: &str,
        subject: &str,
        body: &str,
    ) -> Result<(), NotificationError> {
        if !recipient.contains('@') {
            return Err(NotificationError::Delivery(format!(
                "not an e-mail address: {recipient}"
            )));
        }
        info!(target: "notifications", %recipient, %subject, %body, "notification sent");
        Ok(())
    }
}
