use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use super::post_repository::adjust_counter_sql;
use crate::data::like_repository::LikeRepository;
use crate::data::post_repository::Counter;
use crate::domain::error::DomainError;
use crate::domain::post::PostRef;

#[derive(Debug, Clone)]
pub(crate) struct PostgresLikeRepository {
    pool: PgPool,
}

impl PostgresLikeRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn find_like(&self, author_id: i64, target: PostRef) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id
            FROM likes
            WHERE author_id = $1 AND post_id = $2 AND post_type = $3
            "#,
        )
        .bind(author_id)
        .bind(target.id)
        .bind(target.kind.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_like_db_error)
    }

    async fn insert_like(
        &self,
        author_id: i64,
        target: PostRef,
    ) -> Result<Option<i64>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_like_db_error)?;

        // likes_author_post_key makes the toggle race-free
        let result = sqlx::query(
            r#"
            INSERT INTO likes (author_id, post_id, post_type)
            VALUES ($1, $2, $3)
            ON CONFLICT ON CONSTRAINT likes_author_post_key DO NOTHING
            "#,
        )
        .bind(author_id)
        .bind(target.id)
        .bind(target.kind.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_like_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let count = bump_like_count(&mut tx, target, 1).await?;
        tx.commit().await.map_err(map_like_db_error)?;
        Ok(Some(count))
    }

    async fn delete_like(&self, like_id: i64, target: PostRef) -> Result<Option<i64>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_like_db_error)?;

        let result = sqlx::query("DELETE FROM likes WHERE id = $1")
            .bind(like_id)
            .execute(&mut *tx)
            .await
            .map_err(map_like_db_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        let count = bump_like_count(&mut tx, target, -1).await?;
        tx.commit().await.map_err(map_like_db_error)?;
        Ok(Some(count))
    }
}

/// A missing post aborts the surrounding transaction.
async fn bump_like_count(
    tx: &mut Transaction<'_, Postgres>,
    target: PostRef,
    delta: i64,
) -> Result<i64, DomainError> {
    sqlx::query_scalar::<_, i64>(&adjust_counter_sql(target, Counter::Likes))
        .bind(target.id)
        .bind(delta)
        .fetch_optional(&mut **tx)
        .await
        .map_err(map_like_db_error)?
        .ok_or_else(|| DomainError::NotFound(target.to_string()))
}

fn map_like_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Upstream(err.to_string())
}
