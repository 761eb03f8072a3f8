use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::{ListQuery, Post, PostKind, PostRef};

#[derive(Debug, Clone)]
pub(crate) struct NewPost {
    pub(crate) kind: PostKind,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) author_id: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct PostPatch {
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
}

/// Denormalized counters owned by the counter synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Counter {
    Likes,
    Comments,
}

impl Counter {
    pub(crate) fn column(self) -> &'static str {
        match self {
            Counter::Likes => "like_count",
            Counter::Comments => "comment_count",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PostCounters {
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
}

#[async_trait]
pub(crate) trait PostRepository: Send + Sync {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError>;
    async fn get_post(&self, target: PostRef) -> Result<Option<Post>, DomainError>;
    async fn update_post(
        &self,
        target: PostRef,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError>;
    /// Deletes the post together with its likes and comments.
    async fn delete_post(&self, target: PostRef) -> Result<bool, DomainError>;
    async fn list_posts(&self, kind: PostKind, query: &ListQuery)
    -> Result<Vec<Post>, DomainError>;
    async fn count_posts(&self, kind: PostKind, search: Option<&str>) -> Result<i64, DomainError>;
    async fn increment_view_count(&self, target: PostRef) -> Result<Option<i64>, DomainError>;
    /// Atomically adds `delta` (never going below zero) and returns the stored value.
    async fn adjust_counter(
        &self,
        target: PostRef,
        counter: Counter,
        delta: i64,
    ) -> Result<Option<i64>, DomainError>;
    /// Whether any stored post, of either kind, still uses `url` as its
    /// thumbnail or inside its content.
    async fn image_in_use(&self, url: &str) -> Result<bool, DomainError>;
    /// Recomputes both counters from the like and comment rows.
    async fn recount(&self, target: PostRef) -> Result<Option<PostCounters>, DomainError>;
}
