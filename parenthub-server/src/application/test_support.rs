//! In-memory repositories and storage shared by the service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::like_repository::LikeRepository;
use crate::data::object_storage::ObjectStorage;
use crate::data::post_repository::{Counter, NewPost, PostCounters, PostPatch, PostRepository};
use crate::domain::access::Identity;
use crate::domain::comment::{Comment, CommentAuthor, CommentWithAuthor};
use crate::domain::error::DomainError;
use crate::domain::post::{ListQuery, Post, PostKind, PostRef};
use crate::domain::user::{AccountStatus, Role};

pub(crate) fn identity(user_id: i64, role: Role) -> Identity {
    Identity {
        user_id,
        nickname: format!("user{user_id}"),
        role,
        status: AccountStatus::Active,
    }
}

pub(crate) fn banned(user_id: i64, role: Role) -> Identity {
    Identity {
        status: AccountStatus::Banned,
        ..identity(user_id, role)
    }
}

#[derive(Default)]
pub(crate) struct StoreState {
    pub(crate) posts: HashMap<PostRef, Post>,
    pub(crate) likes: Vec<(i64, i64, PostRef)>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) next_id: i64,
    pub(crate) fail_counter_updates: bool,
}

impl StoreState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    pub(crate) fn like_rows(&self, target: PostRef) -> i64 {
        self.likes.iter().filter(|(_, _, post)| *post == target).count() as i64
    }

    pub(crate) fn comment_rows(&self, target: PostRef) -> i64 {
        self.comments
            .iter()
            .filter(|comment| comment.post == target)
            .count() as i64
    }

    fn apply_counter(&mut self, target: PostRef, counter: Counter, delta: i64) -> Option<i64> {
        self.posts.get_mut(&target).map(|post| {
            let value = match counter {
                Counter::Likes => &mut post.like_count,
                Counter::Comments => &mut post.comment_count,
            };
            *value = (*value + delta).max(0);
            *value
        })
    }

    /// Row write plus counter bump; a failing bump leaves the rows untouched.
    fn in_transaction(
        &mut self,
        target: PostRef,
        counter: Counter,
        delta: i64,
        write: impl FnOnce(&mut Self),
    ) -> Result<i64, DomainError> {
        if self.fail_counter_updates {
            return Err(DomainError::Upstream("counter update failed".to_string()));
        }
        if !self.posts.contains_key(&target) {
            return Err(DomainError::NotFound(target.to_string()));
        }
        write(self);
        self.apply_counter(target, counter, delta)
            .ok_or_else(|| DomainError::NotFound(target.to_string()))
    }
}

/// One shared state behind the post, like and comment repository traits.
#[derive(Clone, Default)]
pub(crate) struct FakeStore {
    state: Arc<Mutex<StoreState>>,
}

impl FakeStore {
    pub(crate) fn state(&self) -> MutexGuard<'_, StoreState> {
        self.state.lock().expect("store mutex poisoned")
    }

    pub(crate) fn seed_post(&self, kind: PostKind, author_id: i64) -> PostRef {
        self.seed_post_with(kind, author_id, "<p>body</p>", None)
    }

    pub(crate) fn seed_post_with(
        &self,
        kind: PostKind,
        author_id: i64,
        content: &str,
        image_url: Option<&str>,
    ) -> PostRef {
        let mut state = self.state();
        let id = state.next_id();
        let now = Utc::now();
        let post = Post {
            id,
            kind,
            title: format!("post {id}"),
            content: content.to_string(),
            image_url: image_url.map(str::to_string),
            author_id,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        let target = post.post_ref();
        state.posts.insert(target, post);
        target
    }

    pub(crate) fn post(&self, target: PostRef) -> Post {
        self.state()
            .posts
            .get(&target)
            .cloned()
            .expect("post must exist")
    }

    pub(crate) fn fail_counter_updates(&self) {
        self.state().fail_counter_updates = true;
    }
}

#[async_trait]
impl PostRepository for FakeStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.state();
        let id = state.next_id();
        let now = Utc::now();
        let post = Post {
            id,
            kind: input.kind,
            title: input.title,
            content: input.content,
            image_url: input.image_url,
            author_id: input.author_id,
            view_count: 0,
            like_count: 0,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        state.posts.insert(post.post_ref(), post.clone());
        Ok(post)
    }

    async fn get_post(&self, target: PostRef) -> Result<Option<Post>, DomainError> {
        Ok(self.state().posts.get(&target).cloned())
    }

    async fn update_post(
        &self,
        target: PostRef,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let mut state = self.state();
        let Some(post) = state.posts.get_mut(&target) else {
            return Ok(None);
        };
        post.title = patch.title;
        post.content = patch.content;
        post.image_url = patch.image_url;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, target: PostRef) -> Result<bool, DomainError> {
        let mut state = self.state();
        state.likes.retain(|(_, _, post)| *post != target);
        state.comments.retain(|comment| comment.post != target);
        Ok(state.posts.remove(&target).is_some())
    }

    async fn list_posts(
        &self,
        kind: PostKind,
        query: &ListQuery,
    ) -> Result<Vec<Post>, DomainError> {
        let state = self.state();
        let mut posts: Vec<Post> = state
            .posts
            .values()
            .filter(|post| post.kind == kind)
            .filter(|post| matches_search(post, query.search.as_deref()))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(posts
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .collect())
    }

    async fn count_posts(&self, kind: PostKind, search: Option<&str>) -> Result<i64, DomainError> {
        let state = self.state();
        Ok(state
            .posts
            .values()
            .filter(|post| post.kind == kind && matches_search(post, search))
            .count() as i64)
    }

    async fn increment_view_count(&self, target: PostRef) -> Result<Option<i64>, DomainError> {
        let mut state = self.state();
        Ok(state.posts.get_mut(&target).map(|post| {
            post.view_count += 1;
            post.view_count
        }))
    }

    async fn adjust_counter(
        &self,
        target: PostRef,
        counter: Counter,
        delta: i64,
    ) -> Result<Option<i64>, DomainError> {
        let mut state = self.state();
        if state.fail_counter_updates {
            return Err(DomainError::Upstream("counter update failed".to_string()));
        }
        Ok(state.apply_counter(target, counter, delta))
    }

    async fn image_in_use(&self, url: &str) -> Result<bool, DomainError> {
        Ok(self
            .state()
            .posts
            .values()
            .any(|post| post.image_url.as_deref() == Some(url) || post.content.contains(url)))
    }

    async fn recount(&self, target: PostRef) -> Result<Option<PostCounters>, DomainError> {
        let mut state = self.state();
        let like_count = state.like_rows(target);
        let comment_count = state.comment_rows(target);
        Ok(state.posts.get_mut(&target).map(|post| {
            post.like_count = like_count;
            post.comment_count = comment_count;
            PostCounters {
                like_count,
                comment_count,
            }
        }))
    }
}

#[async_trait]
impl LikeRepository for FakeStore {
    async fn find_like(&self, author_id: i64, target: PostRef) -> Result<Option<i64>, DomainError> {
        Ok(self
            .state()
            .likes
            .iter()
            .find(|(_, author, post)| *author == author_id && *post == target)
            .map(|(id, _, _)| *id))
    }

    async fn insert_like(
        &self,
        author_id: i64,
        target: PostRef,
    ) -> Result<Option<i64>, DomainError> {
        let mut state = self.state();
        if state
            .likes
            .iter()
            .any(|(_, author, post)| *author == author_id && *post == target)
        {
            return Ok(None);
        }
        let id = state.next_id();
        state
            .in_transaction(target, Counter::Likes, 1, |state| {
                state.likes.push((id, author_id, target));
            })
            .map(Some)
    }

    async fn delete_like(&self, like_id: i64, target: PostRef) -> Result<Option<i64>, DomainError> {
        let mut state = self.state();
        if !state.likes.iter().any(|(id, _, _)| *id == like_id) {
            return Ok(None);
        }
        state
            .in_transaction(target, Counter::Likes, -1, |state| {
                state.likes.retain(|(id, _, _)| *id != like_id);
            })
            .map(Some)
    }
}

#[async_trait]
impl CommentRepository for FakeStore {
    async fn create_comment(
        &self,
        input: NewComment,
    ) -> Result<(CommentWithAuthor, i64), DomainError> {
        let mut state = self.state();
        let id = state.next_id();
        let now = Utc::now();
        let comment = Comment {
            id,
            content: input.content,
            author_id: input.author_id,
            post: input.post,
            created_at: now,
            updated_at: now,
        };
        let row = comment.clone();
        let comment_count = state.in_transaction(input.post, Counter::Comments, 1, |state| {
            state.comments.push(row);
        })?;
        Ok((
            CommentWithAuthor {
                author: CommentAuthor {
                    id: comment.author_id,
                    nickname: format!("user{}", comment.author_id),
                    role: Role::User,
                },
                comment,
            },
            comment_count,
        ))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .state()
            .comments
            .iter()
            .find(|comment| comment.id == id)
            .cloned())
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let mut state = self.state();
        let before = state.comments.len();
        state.comments.retain(|comment| comment.id != id);
        Ok(state.comments.len() != before)
    }

    async fn list_comments(&self, target: PostRef) -> Result<Vec<CommentWithAuthor>, DomainError> {
        let state = self.state();
        Ok(state
            .comments
            .iter()
            .filter(|comment| comment.post == target)
            .map(|comment| CommentWithAuthor {
                author: CommentAuthor {
                    id: comment.author_id,
                    nickname: format!("user{}", comment.author_id),
                    role: Role::User,
                },
                comment: comment.clone(),
            })
            .collect())
    }
}

fn matches_search(post: &Post, search: Option<&str>) -> bool {
    match search {
        None => true,
        Some(needle) => {
            let needle = needle.to_lowercase();
            post.title.to_lowercase().contains(&needle)
                || post.content.to_lowercase().contains(&needle)
        }
    }
}

pub(crate) const FAKE_STORAGE_BASE: &str = "https://cdn.test/uploads/";

#[derive(Clone, Default)]
pub(crate) struct FakeStorage {
    pub(crate) objects: Arc<Mutex<HashMap<String, (Vec<u8>, String)>>>,
    pub(crate) removed: Arc<Mutex<Vec<String>>>,
    pub(crate) fail_removals: bool,
}

impl FakeStorage {
    pub(crate) fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("removed mutex poisoned").clone()
    }

    pub(crate) fn object(&self, path: &str) -> Option<(Vec<u8>, String)> {
        self.objects
            .lock()
            .expect("objects mutex poisoned")
            .get(path)
            .cloned()
    }

    pub(crate) fn paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .expect("objects mutex poisoned")
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError> {
        self.objects
            .lock()
            .expect("objects mutex poisoned")
            .insert(path.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> Result<(), DomainError> {
        if self.fail_removals {
            return Err(DomainError::Upstream("storage unavailable".to_string()));
        }
        self.removed
            .lock()
            .expect("removed mutex poisoned")
            .push(path.to_string());
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{FAKE_STORAGE_BASE}{path}")
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        public_url.strip_prefix(FAKE_STORAGE_BASE).map(str::to_string)
    }
}
