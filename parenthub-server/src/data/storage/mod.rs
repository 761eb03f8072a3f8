use async_trait::async_trait;

use crate::data::object_storage::ObjectStorage;
use crate::domain::error::DomainError;

pub(crate) mod local;
pub(crate) mod supabase;

use local::LocalStorage;
use supabase::SupabaseStorage;

/// Storage selected at startup by `STORAGE_BACKEND`.
pub(crate) enum StorageBackend {
    Local(LocalStorage),
    Supabase(SupabaseStorage),
}

#[async_trait]
impl ObjectStorage for StorageBackend {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError> {
        match self {
            StorageBackend::Local(storage) => storage.put_object(path, bytes, content_type).await,
            StorageBackend::Supabase(storage) => {
                storage.put_object(path, bytes, content_type).await
            }
        }
    }

    async fn remove_object(&self, path: &str) -> Result<(), DomainError> {
        match self {
            StorageBackend::Local(storage) => storage.remove_object(path).await,
            StorageBackend::Supabase(storage) => storage.remove_object(path).await,
        }
    }

    fn public_url(&self, path: &str) -> String {
        match self {
            StorageBackend::Local(storage) => storage.public_url(path),
            StorageBackend::Supabase(storage) => storage.public_url(path),
        }
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        match self {
            StorageBackend::Local(storage) => storage.object_path(public_url),
            StorageBackend::Supabase(storage) => storage.object_path(public_url),
        }
    }
}

/// Accepts only relative `a/b/c.ext` paths without empty, `.` or `..` segments.
pub(crate) fn checked_object_path(path: &str) -> Result<&str, DomainError> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && !path.contains('\\')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");
    if !valid {
        return Err(DomainError::Validation {
            field: "path",
            message: "invalid object path",
        });
    }
    Ok(path)
}

fn strip_url_prefix(public_url: &str, prefix: &str) -> Option<String> {
    let rest = public_url.strip_prefix(prefix)?;
    let rest = rest.split(['?', '#']).next().unwrap_or_default();
    let decoded = urlencoding::decode(rest).ok()?;
    checked_object_path(&decoded).ok().map(str::to_string)
}
