use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::application::image_normalizer::{ImageLimits, mime_essence, normalize};
use crate::data::object_storage::ObjectStorage;
use crate::domain::error::DomainError;

pub(crate) const UPLOAD_DIR: &str = "column-images";

#[derive(Debug, Clone)]
pub(crate) struct UploadedImage {
    pub(crate) url: String,
    pub(crate) path: String,
    pub(crate) content_type: &'static str,
    pub(crate) size: usize,
}

pub(crate) struct UploadService<S: ObjectStorage> {
    storage: Arc<S>,
    limits: ImageLimits,
}

impl<S: ObjectStorage> UploadService<S> {
    pub(crate) fn new(storage: Arc<S>, limits: ImageLimits) -> Self {
        Self { storage, limits }
    }

    /// Normalizes an uploaded image and stores it under a fresh name.
    ///
    /// Nothing is written to storage unless normalization succeeded.
    pub(crate) async fn upload_image(
        &self,
        uploader_id: i64,
        bytes: Vec<u8>,
        declared_content_type: &str,
    ) -> Result<UploadedImage, DomainError> {
        let mime = mime_essence(declared_content_type);
        if !mime.starts_with("image/") {
            return Err(DomainError::Validation {
                field: "file",
                message: "only image files can be uploaded",
            });
        }
        if bytes.is_empty() {
            return Err(DomainError::Validation {
                field: "file",
                message: "must not be empty",
            });
        }

        let original_size = bytes.len();
        let limits = self.limits;
        let normalized = tokio::task::spawn_blocking(move || normalize(&bytes, &mime, &limits))
            .await
            .map_err(|err| DomainError::Unexpected(format!("image task failed: {err}")))??;

        let path = format!(
            "{UPLOAD_DIR}/{}.{}",
            Uuid::new_v4(),
            normalized.format.extension()
        );
        let content_type = normalized.content_type();
        let size = normalized.bytes.len();
        let dimensions = normalized.dimensions;
        self.storage
            .put_object(&path, normalized.bytes, content_type)
            .await?;

        info!(
            uploader_id,
            %path,
            original_size,
            size,
            content_type,
            ?dimensions,
            "image uploaded"
        );
        Ok(UploadedImage {
            url: self.storage.public_url(&path),
            path,
            content_type,
            size,
        })
    }
}
