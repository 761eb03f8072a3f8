use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::interaction_service::LikeToggle;
use crate::domain::post::{PostKind, PostRef};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{ApiJson, ApiQuery};
use crate::presentation::http::middleware::auth::AuthenticatedUser;

/// Target post of a like or comment request.
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub(crate) struct PostTargetDto {
    pub(crate) post_id: i64,
    /// column or community
    pub(crate) post_type: String,
}

impl PostTargetDto {
    pub(crate) fn post_ref(&self) -> AppResult<PostRef> {
        let kind = PostKind::parse(&self.post_type)?;
        Ok(PostRef::new(kind, self.post_id)?)
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ToggleLikeResponseDto {
    pub(crate) success: bool,
    /// added or removed
    pub(crate) action: String,
    pub(crate) liked: bool,
    pub(crate) like_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LikeStatusResponseDto {
    pub(crate) liked: bool,
}

impl From<LikeToggle> for ToggleLikeResponseDto {
    fn from(toggle: LikeToggle) -> Self {
        Self {
            success: true,
            action: toggle.action.as_str().to_string(),
            liked: toggle.liked,
            like_count: toggle.like_count,
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/likes",
    tag = "likes",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostTargetDto,
    responses(
        (status = 200, description = "Like toggled", body = ToggleLikeResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn toggle_like(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(dto): ApiJson<PostTargetDto>,
) -> AppResult<Json<ToggleLikeResponseDto>> {
    let target = dto.post_ref()?;
    let toggle = state
        .interaction_service
        .toggle_like(&identity, target)
        .await?;

    Ok(Json(toggle.into()))
}

#[utoipa::path(
    get,
    path = "/api/likes",
    tag = "likes",
    security(
        ("bearer_auth" = [])
    ),
    params(PostTargetDto),
    responses(
        (status = 200, description = "Like status", body = LikeStatusResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn like_status(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiQuery(query): ApiQuery<PostTargetDto>,
) -> AppResult<Json<LikeStatusResponseDto>> {
    let target = query.post_ref()?;
    let liked = state
        .interaction_service
        .like_status(&identity, target)
        .await?;

    Ok(Json(LikeStatusResponseDto { liked }))
}
