use async_trait::async_trait;

use crate::domain::error::DomainError;

#[async_trait]
pub(crate) trait ObjectStorage: Send + Sync {
    /// Stores `bytes` under `path`, replacing an existing object.
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError>;
    async fn remove_object(&self, path: &str) -> Result<(), DomainError>;
    fn public_url(&self, path: &str) -> String;
    /// Maps a public URL produced by this storage back to its object path.
    fn object_path(&self, public_url: &str) -> Option<String>;
}
