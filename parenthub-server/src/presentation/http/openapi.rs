use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::access::AccessResponseDto;
use crate::presentation::http::handlers::admin::RecountResponseDto;
use crate::presentation::http::handlers::auth::{
    AuthResponseDto, CheckNicknameResponseDto, LoginDto, LogoutResponseDto, OAuthSignInDto,
    RegisterDto, UserDto,
};
use crate::presentation::http::handlers::comments::{
    CommentAuthorDto, CommentDto, CreateCommentDto, CreateCommentResponseDto,
    DeleteCommentResponseDto,
};
use crate::presentation::http::handlers::health::HealthzResponse;
use crate::presentation::http::handlers::likes::{
    LikeStatusResponseDto, PostTargetDto, ToggleLikeResponseDto,
};
use crate::presentation::http::handlers::posts::{
    CreatePostDto, ListPostsResponseDto, PaginationDto, PostDetailDto, PostDto, UpdatePostDto,
};
use crate::presentation::http::handlers::uploads::{UploadForm, UploadResponseDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::health::healthz,
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::auth::logout,
        crate::presentation::http::handlers::auth::check_nickname,
        crate::presentation::http::handlers::auth::oauth_sign_in,
        crate::presentation::http::handlers::posts::list_columns,
        crate::presentation::http::handlers::posts::get_column,
        crate::presentation::http::handlers::posts::create_column,
        crate::presentation::http::handlers::posts::update_column,
        crate::presentation::http::handlers::posts::delete_column,
        crate::presentation::http::handlers::posts::list_community,
        crate::presentation::http::handlers::posts::get_community_post,
        crate::presentation::http::handlers::posts::create_community_post,
        crate::presentation::http::handlers::posts::update_community_post,
        crate::presentation::http::handlers::posts::delete_community_post,
        crate::presentation::http::handlers::likes::toggle_like,
        crate::presentation::http::handlers::likes::like_status,
        crate::presentation::http::handlers::comments::list_comments,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::uploads::upload_image,
        crate::presentation::http::handlers::admin::recount_post,
        crate::presentation::http::handlers::access::check_access
    ),
    components(
        schemas(
            HealthzResponse,
            RegisterDto,
            LoginDto,
            OAuthSignInDto,
            AuthResponseDto,
            UserDto,
            CheckNicknameResponseDto,
            LogoutResponseDto,
            CreatePostDto,
            UpdatePostDto,
            PostDto,
            PostDetailDto,
            PaginationDto,
            ListPostsResponseDto,
            PostTargetDto,
            ToggleLikeResponseDto,
            LikeStatusResponseDto,
            CreateCommentDto,
            CommentAuthorDto,
            CommentDto,
            CreateCommentResponseDto,
            DeleteCommentResponseDto,
            UploadForm,
            UploadResponseDto,
            RecountResponseDto,
            AccessResponseDto
        )
    ),
    tags(
        (name = "health", description = "Liveness probe"),
        (name = "auth", description = "Registration, login and OAuth sign-in"),
        (name = "columns", description = "Expert columns"),
        (name = "community", description = "Community board"),
        (name = "likes", description = "Like toggling"),
        (name = "comments", description = "Comments on columns and community posts"),
        (name = "uploads", description = "Image uploads"),
        (name = "admin", description = "Administrative maintenance"),
        (name = "access", description = "Page access decisions for the web front-end")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}
