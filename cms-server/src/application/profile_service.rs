use tracing::{info, warn};

use crate::data::activity_repository::ActivityRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::PostRepository;
use crate::data::user_repository::{AccountPatch, UserAccount, UserRepository};
use crate::domain::activity::Activity;
use crate::domain::authz::{Action, Actor, Resource, ensure};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::profile::{
    AuthorRequestStatus, RequestOutcome, RequestTransition, UpdateProfileRequest,
};

const PROFILE_RECENT_ACTIVITY: i64 = 10;

/// Own account page: the account plus the user's posts and comments in
/// every status and the latest activity.
#[derive(Debug, Clone)]
pub(crate) struct ProfileView {
    pub(crate) account: UserAccount,
    pub(crate) posts: Vec<Post>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) recent_activity: Vec<Activity>,
}

pub(crate) struct ProfileService<
    U: UserRepository,
    A: ActivityRepository,
    P: PostRepository,
    C: CommentRepository,
> {
    users: U,
    activity: A,
    posts: P,
    comments: C,
}

impl<U, A, P, C> ProfileService<U, A, P, C>
where
    U: UserRepository,
    A: ActivityRepository,
    P: PostRepository,
    C: CommentRepository,
{
    pub(crate) fn new(users: U, activity: A, posts: P, comments: C) -> Self {
        Self {
            users,
            activity,
            posts,
            comments,
        }
    }

    pub(crate) async fn profile(&self, user_id: i64) -> Result<ProfileView, DomainError> {
        let account = self.find_account(user_id).await?;
        let posts = self.posts.list_by_author(user_id).await?;
        let comments = self.comments.list_by_user(user_id).await?;
        let recent_activity = self
            .activity
            .recent_for_user(user_id, PROFILE_RECENT_ACTIVITY)
            .await?;
        Ok(ProfileView {
            account,
            posts,
            comments,
            recent_activity,
        })
    }

    pub(crate) async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<UserAccount, DomainError> {
        let req = req.validate()?;
        let patch = AccountPatch {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            bio: req.bio,
            website: req.website,
        };
        self.users
            .update_account(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }

    /// Idempotent: repeating the request, or asking while already an
    /// author, leaves the profile as it is.
    pub(crate) async fn request_author_role(
        &self,
        user_id: i64,
    ) -> Result<AuthorRequestStatus, DomainError> {
        let mut profile = self.find_account(user_id).await?.profile;
        if RequestTransition::Request.apply(&mut profile) == RequestOutcome::Unchanged {
            return Ok(profile.request_status());
        }
        if self
            .users
            .transition_author_request(user_id, RequestTransition::Request)
            .await?
        {
            info!(user_id, "author role requested");
            return Ok(profile.request_status());
        }
        // The stored row moved on since the read; report what it holds now.
        self.request_status(user_id).await
    }

    pub(crate) async fn request_status(
        &self,
        user_id: i64,
    ) -> Result<AuthorRequestStatus, DomainError> {
        Ok(self.find_account(user_id).await?.profile.request_status())
    }

    pub(crate) async fn pending_requests(
        &self,
        actor: &Actor,
    ) -> Result<Vec<UserAccount>, DomainError> {
        ensure(actor, Action::ManageAuthorRequests, Resource::None)?;
        self.users.list_pending_requests().await
    }

    /// Promotes every selected pending reader. Returns the number changed.
    pub(crate) async fn approve_author_requests(
        &self,
        actor: &Actor,
        user_ids: &[i64],
    ) -> Result<usize, DomainError> {
        ensure(actor, Action::ManageAuthorRequests, Resource::None)?;
        let changed = self
            .apply_to_selection(user_ids, RequestTransition::Approve)
            .await?;
        info!(changed, selected = user_ids.len(), "author requests approved");
        Ok(changed)
    }

    /// Clears the pending flag of every selected profile; roles stay as they are.
    pub(crate) async fn reject_author_requests(
        &self,
        actor: &Actor,
        user_ids: &[i64],
    ) -> Result<usize, DomainError> {
        ensure(actor, Action::ManageAuthorRequests, Resource::None)?;
        let changed = self
            .apply_to_selection(user_ids, RequestTransition::Reject)
            .await?;
        info!(changed, selected = user_ids.len(), "author requests rejected");
        Ok(changed)
    }

    /// Profiles the snapshot already rules out are skipped; the rest go
    /// through the guarded write, which has the final say.
    async fn apply_to_selection(
        &self,
        user_ids: &[i64],
        transition: RequestTransition,
    ) -> Result<usize, DomainError> {
        if user_ids.is_empty() {
            return Ok(0);
        }
        let mut changed = 0;
        for mut profile in self.users.find_profiles(user_ids).await? {
            if transition.apply(&mut profile) == RequestOutcome::Unchanged {
                continue;
            }
            if self
                .users
                .transition_author_request(profile.user_id, transition)
                .await?
            {
                changed += 1;
            } else {
                warn!(
                    user_id = profile.user_id,
                    ?transition,
                    "profile changed concurrently, skipped"
                );
            }
        }
        Ok(changed)
    }

    async fn find_account(&self, user_id: i64) -> Result<UserAccount, DomainError> {
        self.users
            .find_account(user_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user id: {user_id}")))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::ProfileService;
    use crate::application::test_support::MemoryStore;
    use crate::data::activity_repository::ActivityRepository;
    use crate::data::comment_repository::{CommentRepository, NewComment};
    use crate::data::post_repository::{NewPost, PostRepository};
    use crate::domain::activity::{ActivityKind, ClientInfo, NewActivity};
    use crate::domain::comment::CommentStatus;
    use crate::domain::error::DomainError;
    use crate::domain::post::PostStatus;
    use crate::domain::profile::{AuthorRequestStatus, Role, UpdateProfileRequest};

    fn service(
        store: &MemoryStore,
    ) -> ProfileService<MemoryStore, MemoryStore, MemoryStore, MemoryStore> {
        ProfileService::new(store.clone(), store.clone(), store.clone(), store.clone())
    }

    #[tokio::test]
    async fn request_is_idempotent() {
        let store = MemoryStore::new();
        let reader = store.add_user("reader", Role::Reader, false);
        let service = service(&store);

        for _ in 0..2 {
            let status = service
                .request_author_role(reader.user_id)
                .await
                .expect("request must succeed");
            assert_eq!(status, AuthorRequestStatus::Pending);
        }
        assert!(store.profile(reader.user_id).author_request_pending);
    }

    #[tokio::test]
    async fn authors_requesting_stay_approved() {
        let store = MemoryStore::new();
        let author = store.add_user("writer", Role::Author, false);

        let status = service(&store)
            .request_author_role(author.user_id)
            .await
            .expect("request must succeed");
        assert_eq!(status, AuthorRequestStatus::Approved);
        assert!(!store.profile(author.user_id).author_request_pending);
    }

    #[tokio::test]
    async fn bulk_approve_skips_admin_with_stale_flag() {
        let store = MemoryStore::new();
        let staff = store.add_user("staff", Role::Admin, true);
        let reader = store.add_user("reader", Role::Reader, false);
        let admin = store.add_user("admin", Role::Admin, false);
        store.set_pending(reader.user_id, true);
        store.set_pending(admin.user_id, true);

        let changed = service(&store)
            .approve_author_requests(&staff, &[reader.user_id, admin.user_id])
            .await
            .expect("approve must succeed");

        assert_eq!(changed, 1);
        let promoted = store.profile(reader.user_id);
        assert_eq!(promoted.role, Role::Author);
        assert!(!promoted.author_request_pending);
        let untouched = store.profile(admin.user_id);
        assert_eq!(untouched.role, Role::Admin);
        assert!(untouched.author_request_pending);
    }

    #[tokio::test]
    async fn bulk_reject_clears_every_pending_flag() {
        let store = MemoryStore::new();
        let staff = store.add_user("staff", Role::Reader, true);
        let reader = store.add_user("reader", Role::Reader, false);
        let admin = store.add_user("admin", Role::Admin, false);
        let idle = store.add_user("idle", Role::Reader, false);
        store.set_pending(reader.user_id, true);
        store.set_pending(admin.user_id, true);

        let changed = service(&store)
            .reject_author_requests(&staff, &[reader.user_id, admin.user_id, idle.user_id])
            .await
            .expect("reject must succeed");

        assert_eq!(changed, 2);
        assert_eq!(store.profile(reader.user_id).role, Role::Reader);
        assert!(!store.profile(reader.user_id).author_request_pending);
        assert_eq!(store.profile(admin.user_id).role, Role::Admin);
        assert!(!store.profile(admin.user_id).author_request_pending);
    }

    #[tokio::test]
    async fn managing_requests_requires_staff() {
        let store = MemoryStore::new();
        let admin = store.add_user("admin", Role::Admin, false);
        let service = service(&store);

        let err = service
            .pending_requests(&admin)
            .await
            .expect_err("non-staff refused");
        assert!(matches!(err, DomainError::Forbidden));
        let err = service
            .approve_author_requests(&admin, &[admin.user_id])
            .await
            .expect_err("non-staff refused");
        assert!(matches!(err, DomainError::Forbidden));
    }

    #[tokio::test]
    async fn pending_requests_lists_flagged_profiles() {
        let store = MemoryStore::new();
        let staff = store.add_user("staff", Role::Reader, true);
        let reader = store.add_user("reader", Role::Reader, false);
        store.add_user("quiet", Role::Reader, false);
        store.set_pending(reader.user_id, true);

        let pending = service(&store)
            .pending_requests(&staff)
            .await
            .expect("staff may list");
        let ids: Vec<i64> = pending.iter().map(|a| a.user.id).collect();
        assert_eq!(ids, vec![reader.user_id]);
    }

    #[tokio::test]
    async fn profile_shows_ten_most_recent_activities() {
        let store = MemoryStore::new();
        let reader = store.add_user("reader", Role::Reader, false);
        for _ in 0..12 {
            store
                .record(NewActivity::new(
                    reader.user_id,
                    ActivityKind::Login,
                    &ClientInfo::default(),
                ))
                .await
                .expect("activity must be recorded");
        }

        let view = service(&store)
            .profile(reader.user_id)
            .await
            .expect("profile must load");
        assert_eq!(view.account.user.username, "reader");
        assert_eq!(view.recent_activity.len(), 10);
    }

    #[tokio::test]
    async fn update_profile_validates_and_persists() {
        let store = MemoryStore::new();
        let reader = store.add_user("reader", Role::Reader, false);
        let service = service(&store);

        let err = service
            .update_profile(
                reader.user_id,
                UpdateProfileRequest {
                    email: "reader@example.com".to_string(),
                    first_name: String::new(),
                    last_name: String::new(),
                    bio: String::new(),
                    website: "not a url".to_string(),
                },
            )
            .await
            .expect_err("bad website");
        assert!(matches!(err, DomainError::Validation { field: "website", .. }));

        let updated = service
            .update_profile(
                reader.user_id,
                UpdateProfileRequest {
                    email: " New@Example.com ".to_string(),
                    first_name: " Ada ".to_string(),
                    last_name: "Lovelace".to_string(),
                    bio: "  Writes about Rust.  ".to_string(),
                    website: "https://example.com".to_string(),
                },
            )
            .await
            .expect("update must succeed");
        assert_eq!(updated.user.email, "new@example.com");
        assert_eq!(updated.profile.bio, "Writes about Rust.");
        assert_eq!(updated.profile.website, "https://example.com");
        assert_eq!(updated.user.first_name, "Ada");
        assert_eq!(updated.user.last_name, "Lovelace");

        let view = service
            .profile(reader.user_id)
            .await
            .expect("profile must load");
        assert_eq!(view.account.user.first_name, "Ada");
        assert_eq!(view.account.user.last_name, "Lovelace");
    }

    #[tokio::test]
    async fn update_profile_rejects_overlong_first_name() {
        let store = MemoryStore::new();
        let reader = store.add_user("reader", Role::Reader, false);

        let err = service(&store)
            .update_profile(
                reader.user_id,
                UpdateProfileRequest {
                    email: "reader@example.com".to_string(),
                    first_name: "a".repeat(31),
                    last_name: String::new(),
                    bio: String::new(),
                    website: String::new(),
                },
            )
            .await
            .expect_err("first name too long");
        assert!(matches!(err, DomainError::Validation { field: "first_name", .. }));
    }

    #[tokio::test]
    async fn profile_lists_own_posts_and_comments_in_every_status() {
        let store = MemoryStore::new();
        let author = store.add_user("writer", Role::Author, false);
        let other = store.add_user("other", Role::Author, false);

        let draft = store
            .create_post(new_post(author.user_id, "draft", PostStatus::Draft))
            .await
            .expect("post must be created");
        let published = store
            .create_post(new_post(author.user_id, "live", PostStatus::Published))
            .await
            .expect("post must be created");
        let foreign = store
            .create_post(new_post(other.user_id, "foreign", PostStatus::Published))
            .await
            .expect("post must be created");

        let pending = store
            .create_comment(NewComment {
                post_id: foreign.id,
                user_id: author.user_id,
                content: "pending remark".to_string(),
            })
            .await
            .expect("comment must be created");
        let approved = store
            .create_comment(NewComment {
                post_id: published.id,
                user_id: author.user_id,
                content: "approved remark".to_string(),
            })
            .await
            .expect("comment must be created");
        store
            .set_status_bulk(&[approved.id], CommentStatus::Approved)
            .await
            .expect("status must be set");
        store
            .create_comment(NewComment {
                post_id: published.id,
                user_id: other.user_id,
                content: "not mine".to_string(),
            })
            .await
            .expect("comment must be created");

        let view = service(&store)
            .profile(author.user_id)
            .await
            .expect("profile must load");

        let post_ids: Vec<i64> = view.posts.iter().map(|p| p.id).collect();
        assert_eq!(post_ids, vec![published.id, draft.id]);
        let comment_ids: Vec<i64> = view.comments.iter().map(|c| c.id).collect();
        assert_eq!(comment_ids, vec![approved.id, pending.id]);
        assert_eq!(view.comments[1].status, CommentStatus::Pending);
    }

    #[tokio::test]
    async fn bulk_approve_respects_role_change_after_read() {
        let store = MemoryStore::new();
        let staff = store.add_user("staff", Role::Reader, true);
        let reader = store.add_user("reader", Role::Reader, false);
        store.set_pending(reader.user_id, true);
        store.change_role_after_read(reader.user_id, Role::Admin);

        let changed = service(&store)
            .approve_author_requests(&staff, &[reader.user_id])
            .await
            .expect("approve must succeed");

        assert_eq!(changed, 0);
        let profile = store.profile(reader.user_id);
        assert_eq!(profile.role, Role::Admin);
        assert!(profile.author_request_pending);
    }

    #[tokio::test]
    async fn bulk_reject_still_clears_flag_after_role_change() {
        let store = MemoryStore::new();
        let staff = store.add_user("staff", Role::Reader, true);
        let reader = store.add_user("reader", Role::Reader, false);
        store.set_pending(reader.user_id, true);
        store.change_role_after_read(reader.user_id, Role::Author);

        let changed = service(&store)
            .reject_author_requests(&staff, &[reader.user_id])
            .await
            .expect("reject must succeed");

        assert_eq!(changed, 1);
        let profile = store.profile(reader.user_id);
        assert_eq!(profile.role, Role::Author);
        assert!(!profile.author_request_pending);
    }

    fn new_post(author_id: i64, slug: &str, status: PostStatus) -> NewPost {
        NewPost {
            title: slug.to_string(),
            slug: slug.to_string(),
            excerpt: String::new(),
            content: "body".to_string(),
            author_id,
            category_id: None,
            tag_ids: Vec::new(),
            status,
            published_at: (status == PostStatus::Published).then(Utc::now),
        }
    }
}
