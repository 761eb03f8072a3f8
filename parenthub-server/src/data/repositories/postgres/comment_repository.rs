use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::post_repository::adjust_counter_sql;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::Counter;
use crate::domain::comment::{Comment, CommentAuthor, CommentWithAuthor};
use crate::domain::error::DomainError;
use crate::domain::post::{PostKind, PostRef};

#[derive(Debug, Clone)]
pub(crate) struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct CommentRow {
    id: i64,
    content: String,
    author_id: i64,
    post_id: i64,
    post_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CommentWithAuthorRow {
    #[sqlx(flatten)]
    comment: CommentRow,
    author_nickname: String,
    author_role: String,
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn create_comment(
        &self,
        input: NewComment,
    ) -> Result<(CommentWithAuthor, i64), DomainError> {
        let target = input.post;
        let mut tx = self.pool.begin().await.map_err(map_comment_db_error)?;

        let row = sqlx::query_as::<_, CommentWithAuthorRow>(
            r#"
            WITH inserted AS (
                INSERT INTO comments (content, author_id, post_id, post_type)
                VALUES ($1, $2, $3, $4)
                RETURNING id, content, author_id, post_id, post_type, created_at, updated_at
            )
            SELECT
                i.id,
                i.content,
                i.author_id,
                i.post_id,
                i.post_type,
                i.created_at,
                i.updated_at,
                u.nickname AS author_nickname,
                u.role AS author_role
            FROM inserted i
            JOIN users u ON u.id = i.author_id
            "#,
        )
        .bind(input.content)
        .bind(input.author_id)
        .bind(input.post.id)
        .bind(input.post.kind.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_comment_db_error)?;

        let comment_count =
            sqlx::query_scalar::<_, i64>(&adjust_counter_sql(target, Counter::Comments))
                .bind(target.id)
                .bind(1_i64)
                .fetch_optional(&mut *tx)
                .await
                .map_err(map_comment_db_error)?
                .ok_or_else(|| DomainError::NotFound(target.to_string()))?;

        tx.commit().await.map_err(map_comment_db_error)?;
        Ok((map_row_to_comment_with_author(row)?, comment_count))
    }

    async fn get_comment(&self, id: i64) -> Result<Option<Comment>, DomainError> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, content, author_id, post_id, post_type, created_at, updated_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        row.map(map_row_to_comment).transpose()
    }

    async fn delete_comment(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_comment_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_comments(&self, target: PostRef) -> Result<Vec<CommentWithAuthor>, DomainError> {
        let rows = sqlx::query_as::<_, CommentWithAuthorRow>(
            r#"
            SELECT
                c.id,
                c.content,
                c.author_id,
                c.post_id,
                c.post_type,
                c.created_at,
                c.updated_at,
                u.nickname AS author_nickname,
                u.role AS author_role
            FROM comments c
            JOIN users u ON u.id = c.author_id
            WHERE c.post_id = $1 AND c.post_type = $2
            ORDER BY c.created_at ASC, c.id ASC
            "#,
        )
        .bind(target.id)
        .bind(target.kind.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(map_comment_db_error)?;

        rows.into_iter().map(map_row_to_comment_with_author).collect()
    }
}

fn map_row_to_comment(row: CommentRow) -> Result<Comment, DomainError> {
    let kind: PostKind = row.post_type.parse()?;
    Ok(Comment {
        id: row.id,
        content: row.content,
        author_id: row.author_id,
        post: PostRef {
            kind,
            id: row.post_id,
        },
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_row_to_comment_with_author(row: CommentWithAuthorRow) -> Result<CommentWithAuthor, DomainError> {
    let comment = map_row_to_comment(row.comment)?;
    let author = CommentAuthor {
        id: comment.author_id,
        nickname: row.author_nickname,
        role: row.author_role.parse()?,
    };
    Ok(CommentWithAuthor { comment, author })
}

fn map_comment_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Upstream(err.to_string())
}
