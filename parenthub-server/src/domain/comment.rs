use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::post::PostRef;
use super::user::Role;

#[derive(Debug, Clone)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) author_id: i64,
    pub(crate) post: PostRef,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentAuthor {
    pub(crate) id: i64,
    pub(crate) nickname: String,
    pub(crate) role: Role,
}

#[derive(Debug, Clone)]
pub(crate) struct CommentWithAuthor {
    pub(crate) comment: Comment,
    pub(crate) author: CommentAuthor,
}

pub(crate) const MAX_COMMENT_CHARS: usize = 2000;

pub(crate) fn normalize_comment_content(content: &str) -> Result<String, DomainError> {
    let content = content.trim();
    if content.is_empty() || content.chars().count() > MAX_COMMENT_CHARS {
        return Err(DomainError::Validation {
            field: "content",
            message: "must be 1..2000 chars",
        });
    }
    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::{MAX_COMMENT_CHARS, normalize_comment_content};

    #[test]
    fn comment_content_is_trimmed() {
        assert_eq!(
            normalize_comment_content("  좋은 글 감사합니다  ").expect("valid"),
            "좋은 글 감사합니다"
        );
    }

    #[test]
    fn comment_content_bounds() {
        assert!(normalize_comment_content(" \n ").is_err());
        assert!(normalize_comment_content(&"가".repeat(MAX_COMMENT_CHARS)).is_ok());
        assert!(normalize_comment_content(&"가".repeat(MAX_COMMENT_CHARS + 1)).is_err());
    }
}
