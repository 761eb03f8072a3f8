use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::post::PostRef;

#[async_trait]
pub(crate) trait LikeRepository: Send + Sync {
    async fn find_like(&self, author_id: i64, target: PostRef) -> Result<Option<i64>, DomainError>;
    /// Inserts the like and bumps the post's `like_count` in one transaction.
    ///
    /// Returns the new count, or `None` when the (author, post) pair already had a like.
    async fn insert_like(&self, author_id: i64, target: PostRef)
    -> Result<Option<i64>, DomainError>;
    /// Deletes the like and decrements `like_count` in one transaction.
    ///
    /// Returns the new count, or `None` when there was nothing to delete.
    async fn delete_like(&self, like_id: i64, target: PostRef) -> Result<Option<i64>, DomainError>;
}
