use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
};
use serde::Serialize;
use tracing::debug;
use utoipa::ToSchema;

use crate::application::upload_service::UploadedImage;
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

const FILE_FIELD: &str = "file";

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UploadResponseDto {
    pub(crate) url: String,
    pub(crate) path: String,
    pub(crate) content_type: String,
    pub(crate) size: usize,
}

/// OpenAPI shape of the multipart form.
#[derive(ToSchema)]
#[allow(dead_code)]
pub(crate) struct UploadForm {
    #[schema(format = Binary)]
    file: String,
}

impl From<UploadedImage> for UploadResponseDto {
    fn from(image: UploadedImage) -> Self {
        Self {
            url: image.url,
            path: image.path,
            content_type: image.content_type.to_string(),
            size: image.size,
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::Rejected {
            status: err.status(),
            message: err.body_text(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/uploads",
    tag = "uploads",
    security(
        ("bearer_auth" = [])
    ),
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponseDto),
        (status = 400, description = "Missing file or not an image"),
        (status = 401, description = "Unauthorized"),
        (status = 413, description = "Payload too large"),
        (status = 500, description = "Image processing or storage failed")
    )
)]
pub(crate) async fn upload_image(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponseDto>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            debug!(field = ?field.name(), "skipping unexpected multipart field");
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await?;

        let uploaded = state
            .upload_service
            .upload_image(identity.user_id, bytes.to_vec(), &content_type)
            .await?;
        return Ok(Json(uploaded.into()));
    }

    Err(AppError::BadRequest("missing multipart field 'file'".to_string()))
}
