use axum::{Json, extract::State};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::post::{PostKind, PostRef};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::ApiPath;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecountResponseDto {
    pub(crate) success: bool,
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
}

#[utoipa::path(
    post,
    path = "/api/admin/posts/{postType}/{id}/recount",
    tag = "admin",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("postType" = String, Path, description = "column or community"),
        ("id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Counters recomputed from likes and comments", body = RecountResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admins only"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn recount_post(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiPath((post_type, id)): ApiPath<(String, i64)>,
) -> AppResult<Json<RecountResponseDto>> {
    let target = PostRef::new(PostKind::parse(&post_type)?, id)?;
    let counters = state.interaction_service.recount(&identity, target).await?;

    Ok(Json(RecountResponseDto {
        success: true,
        like_count: counters.like_count,
        comment_count: counters.comment_count,
    }))
}
