use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{AuthProvider, User};

const USER_COLUMNS: &str = "id, email, nickname, role, status, provider, created_at, updated_at";

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: Option<String>,
    nickname: String,
    role: String,
    status: String,
    provider: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct UserCredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password_hash: Option<String>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let sql = format!(
            "INSERT INTO users (email, nickname, password_hash, provider, provider_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(input.email)
            .bind(input.nickname)
            .bind(input.password_hash)
            .bind(input.provider.as_str())
            .bind(input.provider_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        map_row_to_user(row)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS}, password_hash FROM users \
             WHERE email = $1 AND provider = 'email'"
        );
        let row = sqlx::query_as::<_, UserCredentialsRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let Some(password_hash) = row.password_hash else {
            return Err(DomainError::Unexpected(format!(
                "email account {} has no password hash",
                row.user.id
            )));
        };

        Ok(Some(UserCredentials {
            user: map_row_to_user(row.user)?,
            password_hash,
        }))
    }

    async fn find_by_provider_id(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, DomainError> {
        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE provider = $1 AND provider_id = $2"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(provider.as_str())
            .bind(provider_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)
    }

    async fn nickname_exists(&self, nickname: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE nickname = $1)")
            .bind(nickname)
            .fetch_one(&self.pool)
            .await
            .map_err(map_user_db_error)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    Ok(User {
        id: row.id,
        email: row.email,
        nickname: row.nickname,
        role: row.role.parse()?,
        status: row.status.parse()?,
        provider: row.provider.parse()?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_nickname_key") => "nickname",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource.to_string());
    }
    DomainError::Upstream(err.to_string())
}
