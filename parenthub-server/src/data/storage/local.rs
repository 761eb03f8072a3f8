use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::{checked_object_path, strip_url_prefix};
use crate::data::object_storage::ObjectStorage;
use crate::domain::error::DomainError;

/// URL prefix under which the HTTP server exposes the storage directory.
pub(crate) const LOCAL_PUBLIC_PREFIX: &str = "/uploads";

/// Filesystem storage for development; files are served by the HTTP server.
#[derive(Debug, Clone)]
pub(crate) struct LocalStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    pub(crate) fn new(root: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }

    fn file_path(&self, path: &str) -> Result<PathBuf, DomainError> {
        Ok(self.root.join(checked_object_path(path)?))
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), DomainError> {
        let file_path = self.file_path(path)?;
        if let Some(parent) = file_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| DomainError::Upstream(format!("create storage dir: {err}")))?;
        }
        tokio::fs::write(&file_path, bytes)
            .await
            .map_err(|err| DomainError::Upstream(format!("write object {path}: {err}")))?;
        debug!(path, "object stored on local disk");
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> Result<(), DomainError> {
        let file_path = self.file_path(path)?;
        match tokio::fs::remove_file(&file_path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(DomainError::Upstream(format!(
                "remove object {path}: {err}"
            ))),
        }
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{LOCAL_PUBLIC_PREFIX}/{path}", self.public_base_url)
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        let absolute = format!("{}{LOCAL_PUBLIC_PREFIX}/", self.public_base_url);
        strip_url_prefix(public_url, &absolute)
            .or_else(|| strip_url_prefix(public_url, &format!("{LOCAL_PUBLIC_PREFIX}/")))
    }
}
