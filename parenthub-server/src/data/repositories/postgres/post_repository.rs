use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::post_repository::{Counter, NewPost, PostCounters, PostPatch, PostRepository};
use crate::domain::error::DomainError;
use crate::domain::post::{ListQuery, Post, PostKind, PostRef};

const POST_COLUMNS: &str = "id, title, content, image_url, author_id, view_count, like_count, \
                            comment_count, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct PostRow {
    id: i64,
    title: String,
    content: String,
    image_url: Option<String>,
    author_id: i64,
    view_count: i64,
    like_count: i64,
    comment_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            "INSERT INTO {} (title, content, image_url, author_id) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {POST_COLUMNS}",
            input.kind.table()
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(input.title)
            .bind(input.content)
            .bind(input.image_url)
            .bind(input.author_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(input.kind, row)
    }

    async fn get_post(&self, target: PostRef) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM {} WHERE id = $1",
            target.kind.table()
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(|row| map_row_to_post(target.kind, row)).transpose()
    }

    async fn update_post(
        &self,
        target: PostRef,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            "UPDATE {} \
             SET title = $2, content = $3, image_url = $4, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {POST_COLUMNS}",
            target.kind.table()
        );
        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(target.id)
            .bind(patch.title)
            .bind(patch.content)
            .bind(patch.image_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(|row| map_row_to_post(target.kind, row)).transpose()
    }

    async fn delete_post(&self, target: PostRef) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_post_db_error)?;

        sqlx::query("DELETE FROM likes WHERE post_id = $1 AND post_type = $2")
            .bind(target.id)
            .bind(target.kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        sqlx::query("DELETE FROM comments WHERE post_id = $1 AND post_type = $2")
            .bind(target.id)
            .bind(target.kind.as_str())
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        let sql = format!("DELETE FROM {} WHERE id = $1", target.kind.table());
        let result = sqlx::query(&sql)
            .bind(target.id)
            .execute(&mut *tx)
            .await
            .map_err(map_post_db_error)?;

        tx.commit().await.map_err(map_post_db_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        kind: PostKind,
        query: &ListQuery,
    ) -> Result<Vec<Post>, DomainError> {
        let sql = format!(
            "SELECT {POST_COLUMNS} FROM {} \
             WHERE ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1) \
             ORDER BY {} {}, id DESC \
             LIMIT $2 OFFSET $3",
            kind.table(),
            query.sort.column(),
            query.order.sql()
        );
        let rows = sqlx::query_as::<_, PostRow>(&sql)
            .bind(search_pattern(query.search.as_deref()))
            .bind(i64::from(query.limit))
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter()
            .map(|row| map_row_to_post(kind, row))
            .collect()
    }

    async fn count_posts(&self, kind: PostKind, search: Option<&str>) -> Result<i64, DomainError> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} \
             WHERE ($1::text IS NULL OR title ILIKE $1 OR content ILIKE $1)",
            kind.table()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(search_pattern(search))
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn increment_view_count(&self, target: PostRef) -> Result<Option<i64>, DomainError> {
        let sql = format!(
            "UPDATE {} SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
            target.kind.table()
        );
        sqlx::query_scalar::<_, i64>(&sql)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn adjust_counter(
        &self,
        target: PostRef,
        counter: Counter,
        delta: i64,
    ) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(&adjust_counter_sql(target, counter))
            .bind(target.id)
            .bind(delta)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn image_in_use(&self, url: &str) -> Result<bool, DomainError> {
        let sql = format!(
            "SELECT EXISTS ( \
               SELECT 1 FROM {} WHERE image_url = $1 OR content LIKE $2 \
               UNION ALL \
               SELECT 1 FROM {} WHERE image_url = $1 OR content LIKE $2 \
             )",
            PostKind::Column.table(),
            PostKind::Community.table()
        );
        sqlx::query_scalar::<_, bool>(&sql)
            .bind(url)
            .bind(search_pattern(Some(url)))
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn recount(&self, target: PostRef) -> Result<Option<PostCounters>, DomainError> {
        let sql = format!(
            "UPDATE {} AS p SET \
               like_count = (SELECT COUNT(*) FROM likes l \
                             WHERE l.post_id = p.id AND l.post_type = $2), \
               comment_count = (SELECT COUNT(*) FROM comments c \
                                WHERE c.post_id = p.id AND c.post_type = $2) \
             WHERE p.id = $1 \
             RETURNING p.like_count, p.comment_count",
            target.kind.table()
        );
        let row = sqlx::query_as::<_, (i64, i64)>(&sql)
            .bind(target.id)
            .bind(target.kind.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        Ok(row.map(|(like_count, comment_count)| PostCounters {
            like_count,
            comment_count,
        }))
    }
}

/// `$1` is the post id, `$2` the delta; returns the stored counter.
pub(super) fn adjust_counter_sql(target: PostRef, counter: Counter) -> String {
    let column = counter.column();
    format!(
        "UPDATE {} SET {column} = GREATEST({column} + $2, 0) WHERE id = $1 RETURNING {column}",
        target.kind.table()
    )
}

fn search_pattern(search: Option<&str>) -> Option<String> {
    search.map(|term| {
        let escaped = term
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{escaped}%")
    })
}

fn map_row_to_post(kind: PostKind, row: PostRow) -> Result<Post, DomainError> {
    Post {
        id: row.id,
        kind,
        title: row.title,
        content: row.content,
        image_url: row.image_url,
        author_id: row.author_id,
        view_count: row.view_count,
        like_count: row.like_count,
        comment_count: row.comment_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
    .validated()
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23503")
    {
        return DomainError::NotFound("author".to_string());
    }
    DomainError::Upstream(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::search_pattern;

    #[test]
    fn search_pattern_escapes_like_wildcards() {
        assert_eq!(search_pattern(None), None);
        assert_eq!(search_pattern(Some("수면")).as_deref(), Some("%수면%"));
        assert_eq!(
            search_pattern(Some("100%_done")).as_deref(),
            Some("%100\\%\\_done%")
        );
    }
}
