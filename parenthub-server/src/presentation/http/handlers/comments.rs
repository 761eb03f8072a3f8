use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::domain::comment::CommentWithAuthor;
use crate::domain::post::{PostKind, PostRef};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::http::handlers::likes::PostTargetDto;
use crate::presentation::http::middleware::auth::AuthenticatedUser;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentDto {
    #[validate(length(min = 1, max = 2000))]
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) post_type: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CommentAuthorDto {
    pub(crate) id: i64,
    pub(crate) nickname: String,
    pub(crate) role: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentDto {
    pub(crate) id: i64,
    pub(crate) content: String,
    pub(crate) post_id: i64,
    pub(crate) post_type: String,
    pub(crate) author: CommentAuthorDto,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateCommentResponseDto {
    pub(crate) success: bool,
    pub(crate) comment: CommentDto,
    pub(crate) comment_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DeleteCommentResponseDto {
    pub(crate) success: bool,
    /// Null when the counter could not be updated.
    pub(crate) comment_count: Option<i64>,
}

impl From<CommentWithAuthor> for CommentDto {
    fn from(value: CommentWithAuthor) -> Self {
        let CommentWithAuthor { comment, author } = value;
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post.id,
            post_type: comment.post.kind.as_str().to_string(),
            author: CommentAuthorDto {
                id: author.id,
                nickname: author.nickname,
                role: author.role.as_str().to_string(),
            },
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/comments",
    tag = "comments",
    params(PostTargetDto),
    responses(
        (status = 200, description = "Comments of the post, oldest first", body = [CommentDto]),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_comments(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PostTargetDto>,
) -> AppResult<Json<Vec<CommentDto>>> {
    let target = query.post_ref()?;
    let comments = state.interaction_service.list_comments(target).await?;

    Ok(Json(comments.into_iter().map(CommentDto::from).collect()))
}

#[utoipa::path(
    post,
    path = "/api/comments",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreateCommentDto,
    responses(
        (status = 201, description = "Comment added", body = CreateCommentResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn add_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiJson(dto): ApiJson<CreateCommentDto>,
) -> AppResult<(StatusCode, Json<CreateCommentResponseDto>)> {
    dto.validate()?;
    let target = PostRef::new(PostKind::parse(&dto.post_type)?, dto.post_id)?;

    let added = state
        .interaction_service
        .add_comment(&identity, target, &dto.content)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateCommentResponseDto {
            success: true,
            comment: added.comment.into(),
            comment_count: added.comment_count,
        }),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    tag = "comments",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Comment id")
    ),
    responses(
        (status = 200, description = "Comment deleted", body = DeleteCommentResponseDto),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Comment not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_comment(
    State(state): State<AppState>,
    AuthenticatedUser(identity): AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<DeleteCommentResponseDto>> {
    let comment_count = state
        .interaction_service
        .delete_comment(&identity, id)
        .await?;

    Ok(Json(DeleteCommentResponseDto {
        success: true,
        comment_count,
    }))
}
