use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::post_service::{ListPostsResult, PostDetail};
use crate::domain::post::{
    CreatePostRequest, ListQuery, Post, PostKind, PostRef, UpdatePostRequest,
};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery};
use crate::presentation::http::middleware::auth::{AuthenticatedUser, MaybeUser};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 2048))]
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UpdatePostDto {
    #[validate(length(min = 1, max = 255))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) content: String,
    #[validate(length(max = 2048))]
    pub(crate) image_url: Option<String>,
}

#[derive(Debug, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct ListPostsQuery {
    /// Page number, starting at 1.
    #[validate(range(min = 1))]
    pub(crate) page: Option<u32>,
    /// Items per page (1..=100).
    #[validate(range(min = 1, max = 100))]
    pub(crate) limit: Option<u32>,
    /// created_at, updated_at, title, view_count, like_count or comment_count.
    pub(crate) sort: Option<String>,
    /// asc or desc.
    pub(crate) order: Option<String>,
    /// Case-insensitive search in title and content.
    pub(crate) q: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) post_type: String,
    pub(crate) title: String,
    pub(crate) content: String,
    pub(crate) image_url: Option<String>,
    pub(crate) author_id: i64,
    pub(crate) view_count: i64,
    pub(crate) like_count: i64,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    #[serde(flatten)]
    pub(crate) post: PostDto,
    pub(crate) liked: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationDto {
    pub(crate) page: u32,
    pub(crate) limit: u32,
    pub(crate) total_items: i64,
    pub(crate) total_pages: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ListPostsResponseDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) pagination: PaginationDto,
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            post_type: post.kind.as_str().to_string(),
            title: post.title,
            content: post.content,
            image_url: post.image_url,
            author_id: post.author_id,
            view_count: post.view_count,
            like_count: post.like_count,
            comment_count: post.comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            liked: detail.liked,
        }
    }
}

impl From<ListPostsResult> for ListPostsResponseDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            pagination: PaginationDto {
                page: result.page,
                limit: result.limit,
                total_items: result.total_items,
                total_pages: result.total_pages,
            },
        }
    }
}

async fn list(
    state: &AppState,
    kind: PostKind,
    query: ListPostsQuery,
) -> AppResult<Json<ListPostsResponseDto>> {
    query.validate()?;
    let query = ListQuery::parse(
        query.page,
        query.limit,
        query.sort.as_deref(),
        query.order.as_deref(),
        query.q.as_deref(),
    )?;

    let result = state.post_service.list_posts(kind, query).await?;

    Ok(Json(result.into()))
}

async fn detail(
    state: &AppState,
    kind: PostKind,
    id: i64,
    viewer: MaybeUser,
) -> AppResult<Json<PostDetailDto>> {
    let target = PostRef::new(kind, id)?;
    let detail = state.post_service.get_post(target, viewer.0.as_ref()).await?;

    Ok(Json(detail.into()))
}

async fn create(
    state: &AppState,
    kind: PostKind,
    user: AuthenticatedUser,
    dto: CreatePostDto,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    dto.validate()?;

    let req = CreatePostRequest {
        title: dto.title,
        content: dto.content,
        image_url: dto.image_url,
    };
    let post = state.post_service.create_post(&user.0, kind, req).await?;

    Ok((StatusCode::CREATED, Json(post.into())))
}

async fn update(
    state: &AppState,
    kind: PostKind,
    id: i64,
    user: AuthenticatedUser,
    dto: UpdatePostDto,
) -> AppResult<Json<PostDto>> {
    dto.validate()?;
    let target = PostRef::new(kind, id)?;

    let req = UpdatePostRequest {
        title: dto.title,
        content: dto.content,
        image_url: dto.image_url,
    };
    let post = state.post_service.update_post(&user.0, target, req).await?;

    Ok(Json(post.into()))
}

async fn delete(
    state: &AppState,
    kind: PostKind,
    id: i64,
    user: AuthenticatedUser,
) -> AppResult<StatusCode> {
    let target = PostRef::new(kind, id)?;
    state.post_service.delete_post(&user.0, target).await?;

    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/api/columns",
    tag = "columns",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Columns listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_columns(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    list(&state, PostKind::Column, query).await
}

#[utoipa::path(
    get,
    path = "/api/columns/{id}",
    tag = "columns",
    params(
        ("id" = i64, Path, description = "Column id")
    ),
    responses(
        (status = 200, description = "Column found", body = PostDetailDto),
        (status = 404, description = "Column not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_column(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<PostDetailDto>> {
    detail(&state, PostKind::Column, id, viewer).await
}

#[utoipa::path(
    post,
    path = "/api/columns",
    tag = "columns",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Column created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Only experts and admins write columns"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_column(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    create(&state, PostKind::Column, user, dto).await
}

#[utoipa::path(
    put,
    path = "/api/columns/{id}",
    tag = "columns",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Column id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Column updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Column not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_column(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<UpdatePostDto>,
) -> AppResult<Json<PostDto>> {
    update(&state, PostKind::Column, id, user, dto).await
}

#[utoipa::path(
    delete,
    path = "/api/columns/{id}",
    tag = "columns",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Column id")
    ),
    responses(
        (status = 204, description = "Column deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Column not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_column(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    delete(&state, PostKind::Column, id, user).await
}

#[utoipa::path(
    get,
    path = "/api/community",
    tag = "community",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Community posts listed", body = ListPostsResponseDto),
        (status = 400, description = "Validation error"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_community(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ListPostsQuery>,
) -> AppResult<Json<ListPostsResponseDto>> {
    list(&state, PostKind::Community, query).await
}

#[utoipa::path(
    get,
    path = "/api/community/{id}",
    tag = "community",
    params(
        ("id" = i64, Path, description = "Community post id")
    ),
    responses(
        (status = 200, description = "Post found", body = PostDetailDto),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_community_post(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<Json<PostDetailDto>> {
    detail(&state, PostKind::Community, id, viewer).await
}

#[utoipa::path(
    post,
    path = "/api/community",
    tag = "community",
    security(
        ("bearer_auth" = [])
    ),
    request_body = CreatePostDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Account is banned"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_community_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(dto): ApiJson<CreatePostDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    create(&state, PostKind::Community, user, dto).await
}

#[utoipa::path(
    put,
    path = "/api/community/{id}",
    tag = "community",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Community post id")
    ),
    request_body = UpdatePostDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_community_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
    ApiJson(dto): ApiJson<UpdatePostDto>,
) -> AppResult<Json<PostDto>> {
    update(&state, PostKind::Community, id, user, dto).await
}

#[utoipa::path(
    delete,
    path = "/api/community/{id}",
    tag = "community",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("id" = i64, Path, description = "Community post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_community_post(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiPath(id): ApiPath<i64>,
) -> AppResult<StatusCode> {
    delete(&state, PostKind::Community, id, user).await
}
