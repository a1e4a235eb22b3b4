use async_trait::async_trait;

use crate::domain::activity::{Activity, ActivityKind, NewActivity};
use crate::domain::error::DomainError;

/// Append-only: entries are never updated or deleted through this trait.
#[async_trait]
pub(crate) trait ActivityRepository: Send + Sync {
    async fn record(&self, input: NewActivity) -> Result<Activity, DomainError>;
    async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Activity>, DomainError>;
    async fn count_by_kind(&self, user_id: i64) -> Result<Vec<(ActivityKind, i64)>, DomainError>;
}
