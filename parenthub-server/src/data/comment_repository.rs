use async_trait::async_trait;

use crate::domain::comment::{Comment, CommentWithAuthor};
use crate::domain::error::DomainError;
use crate::domain::post::PostRef;

#[derive(Debug, Clone)]
pub(crate) struct NewComment {
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) post: PostRef,
}

#[async_trait]
pub(crate) trait CommentRepository: Send + Sync {
    /// Inserts the comment and bumps the post's `comment_count` in one
    /// transaction, returning the comment with the new count.
    async fn create_comment(
        &self,
        input: NewComment,
    ) -> Result<(CommentWithAuthor, i64), DomainError>;
    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError>;
    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError>;
    /// Oldest first.
    async fn list_comments(&self, target: PostRef) -> Result<Vec<CommentWithAuthor>, DomainError>;
}
