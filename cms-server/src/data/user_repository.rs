use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::profile::{Profile, RequestTransition, Role};
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

/// A user together with its 1:1 profile.
#[derive(Debug, Clone)]
pub(crate) struct UserAccount {
    pub(crate) user: User,
    pub(crate) profile: Profile,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) password_hash: String,
    pub(crate) is_staff: bool,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) role: Role,
}

#[derive(Debug, Clone)]
pub(crate) struct AccountPatch {
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) bio: String,
    pub(crate) website: String,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    /// Inserts the user and its profile atomically.
    async fn create_user(&self, input: NewUser) -> Result<UserAccount, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_account(&self, user_id: i64) -> Result<Option<UserAccount>, DomainError>;
    async fn update_account(
        &self,
        user_id: i64,
        patch: AccountPatch,
    ) -> Result<Option<UserAccount>, DomainError>;
    /// Applies the transition in a single guarded write against the stored
    /// row. Returns `false` when the stored state no longer allows it.
    async fn transition_author_request(
        &self,
        user_id: i64,
        transition: RequestTransition,
    ) -> Result<bool, DomainError>;
    async fn find_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>, DomainError>;
    async fn list_pending_requests(&self) -> Result<Vec<UserAccount>, DomainError>;
}
