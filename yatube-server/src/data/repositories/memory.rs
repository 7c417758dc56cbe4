//! In-memory implementation of every repository trait, used by tests.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::data::group_repository::{GroupRepository, NewGroup};
use crate::data::post_repository::{NewPost, PostFilter, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::group::Group;
use crate::domain::pagination::PageWindow;
use crate::domain::post::{Author, GroupRef, Post};
use crate::domain::user::User;

#[derive(Debug, Clone)]
struct StoredPost {
    id: i64,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    group_id: Option<i64>,
}

#[derive(Debug, Default)]
struct State {
    users: Vec<UserCredentials>,
    groups: Vec<Group>,
    posts: Vec<StoredPost>,
    next_id: i64,
    clock: Option<DateTime<Utc>>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    // Каждая новая запись получает строго более позднее время.
    fn tick(&mut self) -> DateTime<Utc> {
        let now = match self.clock {
            Some(last) => last + Duration::seconds(1),
            None => Utc::now(),
        };
        self.clock = Some(now);
        now
    }

    fn hydrate(&self, stored: &StoredPost) -> Result<Post, DomainError> {
        let author = self
            .users
            .iter()
            .find(|creds| creds.user.id == stored.author_id)
            .map(|creds| Author {
                id: creds.user.id,
                username: creds.user.username.clone(),
            })
            .ok_or_else(|| DomainError::NotFound("author".to_string()))?;
        let group = stored.group_id.and_then(|group_id| {
            self.groups
                .iter()
                .find(|group| group.id == group_id)
                .map(|group| GroupRef {
                    id: group.id,
                    slug: group.slug.clone(),
                    title: group.title.clone(),
                })
        });

        Post::new(stored.id, stored.text.clone(), stored.pub_date, author, group)
    }

    fn matching(&self, filter: PostFilter) -> Vec<&StoredPost> {
        let mut posts: Vec<&StoredPost> = self
            .posts
            .iter()
            .filter(|post| match filter {
                PostFilter::All => true,
                PostFilter::Group(group_id) => post.group_id == Some(group_id),
                PostFilter::Author(author_id) => post.author_id == author_id,
            })
            .collect();
        posts.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));
        posts
    }

    fn group_exists(&self, group_id: Option<i64>) -> bool {
        group_id.is_none_or(|id| self.groups.iter().any(|group| group.id == id))
    }
}

#[derive(Debug, Clone, Default)]
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

    pub(crate) fn seed_user(&self, username: &str) -> User {
        let mut state = self.lock();
        let id = state.next_id();
        let created_at = state.tick();
        let user = User::new(id, username, format!("{username}@example.com"), created_at)
            .expect("seed user must be valid");
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: String::new(),
        });
        user
    }

    pub(crate) fn seed_group(&self, title: &str, slug: &str, description: &str) -> Group {
        let mut state = self.lock();
        let id = state.next_id();
        let group = Group::new(id, slug, title, description).expect("seed group must be valid");
        state.groups.push(group.clone());
        group
    }

    pub(crate) fn seed_post(&self, author: &User, text: &str, group: Option<&Group>) -> Post {
        let mut state = self.lock();
        let id = state.next_id();
        let pub_date = state.tick();
        let stored = StoredPost {
            id,
            text: text.to_string(),
            pub_date,
            author_id: author.id,
            group_id: group.map(|group| group.id),
        };
        let post = state.hydrate(&stored).expect("seed post must be valid");
        state.posts.push(stored);
        post
    }

    pub(crate) fn post(&self, id: i64) -> Option<Post> {
        let state = self.lock();
        let stored = state.posts.iter().find(|post| post.id == id)?;
        state.hydrate(stored).ok()
    }

    pub(crate) fn post_count(&self) -> usize {
        self.lock().posts.len()
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.lock();
        if !state.group_exists(input.group_id) {
            return Err(DomainError::NotFound("group".to_string()));
        }
        let id = state.next_id();
        let pub_date = state.tick();
        let stored = StoredPost {
            id,
            text: input.text,
            pub_date,
            author_id: input.author_id,
            group_id: input.group_id,
        };
        let post = state.hydrate(&stored)?;
        state.posts.push(stored);
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let state = self.lock();
        state
            .posts
            .iter()
            .find(|post| post.id == id)
            .map(|stored| state.hydrate(stored))
            .transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.lock();
        if !state.group_exists(patch.group_id) {
            return Err(DomainError::NotFound("group".to_string()));
        }
        let Some(stored) = state
            .posts
            .iter_mut()
            .find(|post| post.id == post_id && post.author_id == owner_id)
        else {
            return Ok(None);
        };
        stored.text = patch.text;
        stored.group_id = patch.group_id;
        let stored = stored.clone();

        state.hydrate(&stored).map(Some)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        window: PageWindow,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.lock();
        state
            .matching(filter)
            .into_iter()
            .skip(window.offset.max(0) as usize)
            .take(window.limit.max(0) as usize)
            .map(|stored| state.hydrate(stored))
            .collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        Ok(self.lock().matching(filter).len() as i64)
    }
}

#[async_trait]
impl GroupRepository for MemoryStore {
    async fn create_group(&self, input: NewGroup) -> Result<Group, DomainError> {
        let mut state = self.lock();
        if state.groups.iter().any(|group| group.slug == input.slug) {
            return Err(DomainError::AlreadyExists("group slug".to_string()));
        }
        let id = state.next_id();
        let group = Group::new(id, input.slug, input.title, input.description)?;
        state.groups.push(group.clone());
        Ok(group)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, DomainError> {
        Ok(self.lock().groups.iter().find(|group| group.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, DomainError> {
        Ok(self
            .lock()
            .groups
            .iter()
            .find(|group| group.slug == slug)
            .cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, DomainError> {
        let mut groups = self.lock().groups.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Ok(groups)
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, DomainError> {
        let mut state = self.lock();
        let Some(index) = state.groups.iter().position(|group| group.slug == slug) else {
            return Ok(false);
        };
        let removed = state.groups.remove(index);
        for post in state
            .posts
            .iter_mut()
            .filter(|post| post.group_id == Some(removed.id))
        {
            post.group_id = None;
        }
        Ok(true)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut state = self.lock();
        if state
            .users
            .iter()
            .any(|creds| creds.user.username == input.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        if state.users.iter().any(|creds| creds.user.email == input.email) {
            return Err(DomainError::AlreadyExists("email".to_string()));
        }
        let id = state.next_id();
        let created_at = state.tick();
        let user = User::new(id, input.username, input.email, created_at)?;
        state.users.push(UserCredentials {
            user: user.clone(),
            password_hash: input.password_hash,
        });
        Ok(user)
    }

    async fn find_user(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .map(|creds| creds.user.clone()))
    }

    async fn find_credentials(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .lock()
            .users
            .iter()
            .find(|creds| creds.user.username == username)
            .cloned())
    }
}
