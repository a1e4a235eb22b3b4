//! In-memory repositories shared by the service tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::activity_repository::ActivityRepository;
use crate::data::comment_repository::{CommentRepository, CommentWithPost, NewComment};
use crate::data::post_repository::{NewPost, Pagination, PostRepository};
use crate::data::taxonomy_repository::TaxonomyRepository;
use crate::data::user_repository::{
    AccountPatch, NewUser, UserAccount, UserCredentials, UserRepository,
};
use crate::domain::activity::{Activity, ActivityKind, NewActivity};
use crate::domain::authz::Actor;
use crate::domain::comment::{Comment, CommentStatus};
use crate::domain::error::DomainError;
use crate::domain::post::{Post, PostSearch};
use crate::domain::profile::{Profile, RequestOutcome, RequestTransition, Role};
use crate::domain::taxonomy::{Category, CreateCategoryRequest, CreateTagRequest, Tag, TagUsage};
use crate::domain::user::User;

#[derive(Default)]
struct State {
    next_id: i64,
    users: BTreeMap<i64, (User, String)>,
    profiles: BTreeMap<i64, Profile>,
    posts: BTreeMap<i64, Post>,
    comments: BTreeMap<i64, Comment>,
    categories: BTreeMap<i64, Category>,
    tags: BTreeMap<i64, Tag>,
    activities: Vec<Activity>,
    /// Role written right after `find_profiles` takes its snapshot.
    role_change_after_read: Option<(i64, Role)>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("memory store mutex poisoned")
    }

    /// Seeds a user with the given role and returns the matching actor.
    pub(crate) fn add_user(&self, username: &str, role: Role, is_staff: bool) -> Actor {
        let mut state = self.lock();
        let id = state.next_id();
        let now = Utc::now();
        let user = User::new(
            id,
            username.to_string(),
            format!("{username}@example.com"),
            is_staff,
            now,
        )
        .expect("seed user must be valid");
        let profile = Profile {
            user_id: id,
            role,
            author_request_pending: false,
            bio: String::new(),
            website: String::new(),
            created_at: now,
            updated_at: now,
        };
        let actor = Actor::new(&user, &profile);
        state.users.insert(id, (user, String::new()));
        state.profiles.insert(id, profile);
        actor
    }

    pub(crate) fn set_pending(&self, user_id: i64, pending: bool) {
        let mut state = self.lock();
        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.author_request_pending = pending;
        }
    }

    /// Simulates another request changing the role between the snapshot
    /// read and the write of a bulk transition.
    pub(crate) fn change_role_after_read(&self, user_id: i64, role: Role) {
        self.lock().role_change_after_read = Some((user_id, role));
    }

    pub(crate) fn profile(&self, user_id: i64) -> Profile {
        self.lock()
            .profiles
            .get(&user_id)
            .cloned()
            .expect("profile must exist")
    }

    pub(crate) fn actor(&self, user_id: i64) -> Actor {
        let state = self.lock();
        let (user, _) = state.users.get(&user_id).expect("user must exist");
        let profile = state.profiles.get(&user_id).expect("profile must exist");
        Actor::new(user, profile)
    }

    pub(crate) fn post(&self, id: i64) -> Option<Post> {
        self.lock().posts.get(&id).cloned()
    }

    pub(crate) fn activities(&self) -> Vec<Activity> {
        self.lock().activities.clone()
    }

    pub(crate) fn add_category(&self, name: &str, slug: &str) -> Category {
        let mut state = self.lock();
        let id = state.next_id();
        let category = Category {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        state.categories.insert(id, category.clone());
        category
    }

    pub(crate) fn add_tag(&self, name: &str, slug: &str) -> Tag {
        let mut state = self.lock();
        let id = state.next_id();
        let tag = Tag {
            id,
            name: name.to_string(),
            slug: slug.to_string(),
            created_at: Utc::now(),
        };
        state.tags.insert(id, tag.clone());
        tag
    }
}

fn account(state: &State, user_id: i64) -> Option<UserAccount> {
    let (user, _) = state.users.get(&user_id)?;
    let profile = state.profiles.get(&user_id)?;
    Some(UserAccount {
        user: user.clone(),
        profile: profile.clone(),
    })
}

fn matches_search(post: &Post, search: &PostSearch) -> bool {
    if !post.is_published() {
        return false;
    }
    if let Some(query) = &search.query {
        let needle = query.to_lowercase();
        let hit = [&post.title, &post.content, &post.excerpt]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle));
        if !hit {
            return false;
        }
    }
    if search.category_id.is_some() && post.category_id != search.category_id {
        return false;
    }
    if let Some(tag_id) = search.tag_id
        && !post.tag_ids.contains(&tag_id)
    {
        return false;
    }
    true
}

fn newest_published_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<UserAccount, DomainError> {
        let mut state = self.lock();
        if state.users.values().any(|(u, _)| u.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.values().any(|(u, _)| u.email == input.email) {
            return Err(DomainError::Validation {
                field: "email",
                message: "is already registered",
            });
        }
        let id = state.next_id();
        let now = Utc::now();
        let user = User::new(id, input.username, input.email, input.is_staff, now)?
            .with_names(input.first_name, input.last_name);
        let profile = Profile {
            user_id: id,
            role: input.role,
            author_request_pending: false,
            bio: String::new(),
            website: String::new(),
            created_at: now,
            updated_at: now,
        };
        state.users.insert(id, (user, input.password_hash));
        state.profiles.insert(id, profile);
        account(&state, id).ok_or_else(|| DomainError::Unexpected("lost user".to_string()))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(user, _)| user.username == username)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|(user, _)| user.email == email)
            .map(|(user, hash)| UserCredentials {
                user: user.clone(),
                password_hash: hash.clone(),
            }))
    }

    async fn find_account(&self, user_id: i64) -> Result<Option<UserAccount>, DomainError> {
        Ok(account(&self.lock(), user_id))
    }

    async fn update_account(
        &self,
        user_id: i64,
        patch: AccountPatch,
    ) -> Result<Option<UserAccount>, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|(u, _)| u.email == patch.email && u.id != user_id)
        {
            return Err(DomainError::Validation {
                field: "email",
                message: "is already registered",
            });
        }
        let Some((user, _)) = state.users.get_mut(&user_id) else {
            return Ok(None);
        };
        user.email = patch.email;
        user.first_name = patch.first_name;
        user.last_name = patch.last_name;
        if let Some(profile) = state.profiles.get_mut(&user_id) {
            profile.bio = patch.bio;
            profile.website = patch.website;
            profile.updated_at = Utc::now();
        }
        Ok(account(&state, user_id))
    }

    async fn transition_author_request(
        &self,
        user_id: i64,
        transition: RequestTransition,
    ) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let Some(stored) = state.profiles.get_mut(&user_id) else {
            return Ok(false);
        };
        let changed = transition.apply(stored) == RequestOutcome::Changed;
        if changed {
            stored.updated_at = Utc::now();
        }
        Ok(changed)
    }

    async fn find_profiles(&self, user_ids: &[i64]) -> Result<Vec<Profile>, DomainError> {
        let mut state = self.lock();
        let snapshot = state
            .profiles
            .values()
            .filter(|p| user_ids.contains(&p.user_id))
            .cloned()
            .collect();
        if let Some((user_id, role)) = state.role_change_after_read.take()
            && let Some(profile) = state.profiles.get_mut(&user_id)
        {
            profile.role = role;
        }
        Ok(snapshot)
    }

    async fn list_pending_requests(&self) -> Result<Vec<UserAccount>, DomainError> {
        let state = self.lock();
        Ok(state
            .profiles
            .values()
            .filter(|p| p.author_request_pending)
            .filter_map(|p| account(&state, p.user_id))
            .collect())
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if state.posts.values().any(|p| p.slug == input.slug) {
            return Err(DomainError::AlreadyExists("post slug".to_string()));
        }
        let id = state.next_id();
        let now = Utc::now();
        let post = Post {
            id,
            title: input.title,
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            author_id: input.author_id,
            category_id: input.category_id,
            tag_ids: input.tag_ids,
            status: input.status,
            views_count: 0,
            created_at: now,
            updated_at: now,
            published_at: input.published_at,
        };
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.get(&id).cloned())
    }

    async fn get_post_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.lock().posts.values().find(|p| p.slug == slug).cloned())
    }

    async fn update_post(&self, post: &Post) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        let Some(stored) = state.posts.get_mut(&post.id) else {
            return Ok(None);
        };
        let views_count = stored.views_count;
        *stored = post.clone();
        stored.views_count = views_count;
        Ok(Some(stored.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let removed = state.posts.remove(&id).is_some();
        if removed {
            state.comments.retain(|_, c| c.post_id != id);
            for activity in state.activities.iter_mut() {
                if activity.post_id == Some(id) {
                    activity.post_id = None;
                }
            }
        }
        Ok(removed)
    }

    async fn increment_views(&self, id: i64) -> Result<Option<i64>, DomainError> {
        let mut state = self.lock();
        Ok(state.posts.get_mut(&id).map(|post| {
            post.views_count += 1;
            post.views_count
        }))
    }

    async fn list_published(
        &self,
        search: &PostSearch,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let (limit, offset) = pagination.limit_offset();
        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .values()
            .filter(|p| matches_search(p, search))
            .cloned()
            .collect();
        newest_published_first(&mut posts);
        Ok(posts
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_published(&self, search: &PostSearch) -> Result<i64, DomainError> {
        Ok(self
            .lock()
            .posts
            .values()
            .filter(|p| matches_search(p, search))
            .count() as i64)
    }

    async fn popular_posts(&self, limit: i64) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .values()
            .filter(|p| p.is_published())
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.views_count.cmp(&a.views_count).then(b.id.cmp(&a.id)));
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn related_posts(&self, post: &Post, limit: i64) -> Result<Vec<Post>, DomainError> {
        let Some(category_id) = post.category_id else {
            return Ok(Vec::new());
        };
        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .values()
            .filter(|p| p.is_published() && p.category_id == Some(category_id) && p.id != post.id)
            .cloned()
            .collect();
        newest_published_first(&mut posts);
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn list_by_author(&self, author_id: i64) -> Result<Vec<Post>, DomainError> {
        let mut posts: Vec<Post> = self
            .lock()
            .posts
            .values()
            .filter(|p| p.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(posts)
    }
}

#[async_trait]
impl CommentRepository for MemoryStore {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut state = self.lock();
        if !state.posts.contains_key(&input.post_id) {
            return Err(DomainError::NotFound("post".to_string()));
        }
        let id = state.next_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            post_id: input.post_id,
            user_id: input.user_id,
            content: input.content,
            status: CommentStatus::default(),
            created_at: now,
            updated_at: now,
        };
        state.comments.insert(id, comment.clone());
        Ok(comment)
    }

    async fn get_comment(&self, id: i64) -> Result<Option<CommentWithPost>, DomainError> {
        let state = self.lock();
        Ok(state.comments.get(&id).and_then(|comment| {
            state.posts.get(&comment.post_id).map(|post| CommentWithPost {
                comment: comment.clone(),
                post_author_id: post.author_id,
            })
        }))
    }

    async fn save_status(&self, comment: &Comment) -> Result<Option<Comment>, DomainError> {
        let mut state = self.lock();
        Ok(state.comments.get_mut(&comment.id).map(|stored| {
            stored.status = comment.status;
            stored.updated_at = comment.updated_at;
            stored.clone()
        }))
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.lock().comments.remove(&id).is_some())
    }

    async fn list_for_post(
        &self,
        post_id: i64,
        status: Option<CommentStatus>,
    ) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .values()
            .filter(|c| c.post_id == post_id && status.is_none_or(|s| c.status == s))
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(comments)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Comment>, DomainError> {
        let mut comments: Vec<Comment> = self
            .lock()
            .comments
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        comments.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(comments)
    }

    async fn set_status_bulk(&self, ids: &[i64], status: CommentStatus) -> Result<u64, DomainError> {
        let mut state = self.lock();
        let mut updated = 0;
        for id in ids {
            if let Some(comment) = state.comments.get_mut(id) {
                comment.status = status;
                updated += 1;
            }
        }
        Ok(updated)
    }

    async fn count_for_author(&self, author_id: i64) -> Result<i64, DomainError> {
        let state = self.lock();
        Ok(state
            .comments
            .values()
            .filter(|c| {
                state
                    .posts
                    .get(&c.post_id)
                    .is_some_and(|p| p.author_id == author_id)
            })
            .count() as i64)
    }
}

#[async_trait]
impl TaxonomyRepository for MemoryStore {
    async fn create_category(&self, input: CreateCategoryRequest) -> Result<Category, DomainError> {
        let mut state = self.lock();
        if state
            .categories
            .values()
            .any(|c| c.name == input.name || c.slug == input.slug)
        {
            return Err(DomainError::AlreadyExists("category".to_string()));
        }
        let id = state.next_id();
        let category = Category {
            id,
            name: input.name,
            slug: input.slug,
            description: input.description,
            created_at: Utc::now(),
        };
        state.categories.insert(id, category.clone());
        Ok(category)
    }

    async fn create_tag(&self, input: CreateTagRequest) -> Result<Tag, DomainError> {
        let mut state = self.lock();
        if state
            .tags
            .values()
            .any(|t| t.name == input.name || t.slug == input.slug)
        {
            return Err(DomainError::AlreadyExists("tag".to_string()));
        }
        let id = state.next_id();
        let tag = Tag {
            id,
            name: input.name,
            slug: input.slug,
            created_at: Utc::now(),
        };
        state.tags.insert(id, tag.clone());
        Ok(tag)
    }

    async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        let mut categories: Vec<Category> = self.lock().categories.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn find_category_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .lock()
            .categories
            .values()
            .find(|c| c.slug == slug)
            .cloned())
    }

    async fn find_tag_by_slug(&self, slug: &str) -> Result<Option<Tag>, DomainError> {
        Ok(self.lock().tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn popular_tags(&self, limit: i64) -> Result<Vec<TagUsage>, DomainError> {
        let state = self.lock();
        let mut usage: Vec<TagUsage> = state
            .tags
            .values()
            .map(|tag| TagUsage {
                tag: tag.clone(),
                post_count: state
                    .posts
                    .values()
                    .filter(|p| p.tag_ids.contains(&tag.id))
                    .count() as i64,
            })
            .collect();
        usage.sort_by(|a, b| {
            b.post_count
                .cmp(&a.post_count)
                .then_with(|| a.tag.name.cmp(&b.tag.name))
        });
        usage.truncate(limit as usize);
        Ok(usage)
    }
}

#[async_trait]
impl ActivityRepository for MemoryStore {
    async fn record(&self, input: NewActivity) -> Result<Activity, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let activity = Activity {
            id,
            user_id: input.user_id,
            kind: input.kind,
            post_id: input.post_id,
            ip_address: input.client.ip_address,
            user_agent: input.client.user_agent,
            created_at: Utc::now(),
        };
        state.activities.push(activity.clone());
        Ok(activity)
    }

    async fn recent_for_user(&self, user_id: i64, limit: i64) -> Result<Vec<Activity>, DomainError> {
        Ok(self
            .lock()
            .activities
            .iter()
            .rev()
            .filter(|a| a.user_id == user_id)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_by_kind(&self, user_id: i64) -> Result<Vec<(ActivityKind, i64)>, DomainError> {
        let state = self.lock();
        Ok(ActivityKind::ALL
            .into_iter()
            .map(|kind| {
                let count = state
                    .activities
                    .iter()
                    .filter(|a| a.user_id == user_id && a.kind == kind)
                    .count() as i64;
                (kind, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect())
    }
}
