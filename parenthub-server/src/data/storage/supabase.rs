use async_trait::async_trait;
use reqwest::{Client, header};
use serde::Serialize;
use tracing::debug;

use super::{checked_object_path, strip_url_prefix};
use crate::data::object_storage::ObjectStorage;
use crate::domain::error::DomainError;

/// Supabase Storage REST client authenticated with the service-role key.
#[derive(Debug, Clone)]
pub(crate) struct SupabaseStorage {
    client: Client,
    base_url: String,
    bucket: String,
    service_key: String,
}

#[derive(Serialize)]
struct RemoveObjectsBody<'a> {
    prefixes: [&'a str; 1],
}

impl SupabaseStorage {
    pub(crate) fn new(client: Client, base_url: &str, bucket: &str, service_key: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            bucket: bucket.to_string(),
            service_key: service_key.to_string(),
        }
    }

    fn public_prefix(&self) -> String {
        format!("{}/storage/v1/object/public/{}/", self.base_url, self.bucket)
    }
}

#[async_trait]
impl ObjectStorage for SupabaseStorage {
    async fn put_object(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), DomainError> {
        let path = checked_object_path(path)?;
        let url = format!("{}/storage/v1/object/{}/{path}", self.base_url, self.bucket);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .header("x-upsert", "true")
            .header(header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await
            .map_err(|err| DomainError::Upstream(format!("storage upload: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DomainError::Upstream(format!(
                "storage upload returned {status}: {body}"
            )));
        }
        debug!(path, "object uploaded to supabase storage");
        Ok(())
    }

    async fn remove_object(&self, path: &str) -> Result<(), DomainError> {
        let path = checked_object_path(path)?;
        let url = format!("{}/storage/v1/object/{}", self.base_url, self.bucket);

        let response = self
            .client
            .delete(&url)
            .bearer_auth(&self.service_key)
            .header("apikey", &self.service_key)
            .json(&RemoveObjectsBody { prefixes: [path] })
            .send()
            .await
            .map_err(|err| DomainError::Upstream(format!("storage remove: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DomainError::Upstream(format!(
                "storage remove returned {status}"
            )));
        }
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}{path}", self.public_prefix())
    }

    fn object_path(&self, public_url: &str) -> Option<String> {
        strip_url_prefix(public_url, &self.public_prefix())
    }
}
