use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::{AuthProvider, User};

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) email: Option<String>,
    pub(crate) nickname: String,
    pub(crate) password_hash: Option<String>,
    pub(crate) provider: AuthProvider,
    pub(crate) provider_id: Option<String>,
}

#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError>;
    /// Looks up an email/password account.
    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, DomainError>;
    async fn find_by_provider_id(
        &self,
        provider: AuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, DomainError>;
    async fn email_exists(&self, email: &str) -> Result<bool, DomainError>;
    async fn nickname_exists(&self, nickname: &str) -> Result<bool, DomainError>;
}
