use crate::data::activity_repository::ActivityRepository;
use crate::domain::activity::{Activity, ActivityKind};
use crate::domain::error::DomainError;

pub(crate) struct ActivityService<A: ActivityRepository> {
    repo: A,
}

impl<A: ActivityRepository> ActivityService<A> {
    pub(crate) fn new(repo: A) -> Self {
        Self { repo }
    }

    /// Newest first.
    pub(crate) async fn recent(&self, user_id: i64, limit: u32) -> Result<Vec<Activity>, DomainError> {
        self.repo.recent_for_user(user_id, i64::from(limit)).await
    }

    /// One entry per kind, zero when the user never did it.
    pub(crate) async fn summary(&self, user_id: i64) -> Result<Vec<(ActivityKind, i64)>, DomainError> {
        let counts = self.repo.count_by_kind(user_id).await?;
        Ok(ActivityKind::ALL
            .into_iter()
            .map(|kind| {
                let count = counts
                    .iter()
                    .find(|(counted, _)| *counted == kind)
                    .map_or(0, |(_, count)| *count);
                (kind, count)
            })
            .collect())
    }
}
