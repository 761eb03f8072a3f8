use axum::{Json, extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::auth_service::AuthResult;
use crate::domain::user::{AuthProvider, LoginRequest, RegisterRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{ApiJson, ApiPath, ApiQuery};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct RegisterDto {
    #[validate(email)]
    pub(crate) email: String,
    #[validate(length(min = 6, max = 128))]
    pub(crate) password: String,
    #[validate(length(min = 2, max = 20))]
    pub(crate) nickname: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct LoginDto {
    #[validate(length(min = 1, max = 254))]
    pub(crate) email: String,
    #[validate(length(min = 1))]
    pub(crate) password: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OAuthSignInDto {
    #[validate(length(min = 1, max = 4096))]
    pub(crate) access_token: String,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub(crate) struct CheckNicknameQuery {
    pub(crate) nickname: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthResponseDto {
    pub(crate) access_token: String,
    pub(crate) user: UserDto,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserDto {
    pub(crate) id: i64,
    pub(crate) email: Option<String>,
    pub(crate) nickname: String,
    pub(crate) role: String,
    pub(crate) status: String,
    pub(crate) provider: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CheckNicknameResponseDto {
    pub(crate) success: bool,
    pub(crate) exists: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct LogoutResponseDto {
    pub(crate) success: bool,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            nickname: user.nickname,
            role: user.role.as_str().to_string(),
            status: user.status.as_str().to_string(),
            provider: user.provider.as_str().to_string(),
            created_at: user.created_at,
        }
    }
}

impl From<AuthResult> for AuthResponseDto {
    fn from(result: AuthResult) -> Self {
        Self {
            access_token: result.access_token,
            user: result.user.into(),
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "auth",
    request_body = RegisterDto,
    responses(
        (status = 201, description = "Registered successfully", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email or nickname already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn register(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<RegisterDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = RegisterRequest {
        email: dto.email,
        password: dto.password,
        nickname: dto.nickname,
    };

    let result = state.auth_service.register(req).await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "auth",
    request_body = LoginDto,
    responses(
        (status = 200, description = "Login successful", body = AuthResponseDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account is banned"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn login(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<LoginDto>,
) -> AppResult<(StatusCode, Json<AuthResponseDto>)> {
    dto.validate()?;

    let req = LoginRequest {
        email: dto.email,
        password: dto.password,
    };

    let result = state.auth_service.login(req).await?;

    Ok((StatusCode::OK, Json(result.into())))
}

#[utoipa::path(
    post,
    path = "/api/auth/logout",
    tag = "auth",
    responses(
        (status = 200, description = "Client should drop its token", body = LogoutResponseDto)
    )
)]
pub(crate) async fn logout() -> Json<LogoutResponseDto> {
    Json(LogoutResponseDto { success: true })
}

#[utoipa::path(
    get,
    path = "/api/auth/check-nickname",
    tag = "auth",
    params(CheckNicknameQuery),
    responses(
        (status = 200, description = "Nickname checked", body = CheckNicknameResponseDto),
        (status = 400, description = "Malformed nickname"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn check_nickname(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CheckNicknameQuery>,
) -> AppResult<Json<CheckNicknameResponseDto>> {
    let available = state.auth_service.check_nickname(&query.nickname).await?;

    Ok(Json(CheckNicknameResponseDto {
        success: true,
        exists: !available,
    }))
}

#[utoipa::path(
    post,
    path = "/api/auth/oauth/{provider}",
    tag = "auth",
    params(
        ("provider" = String, Path, description = "google or kakao")
    ),
    request_body = OAuthSignInDto,
    responses(
        (status = 200, description = "Signed in", body = AuthResponseDto),
        (status = 400, description = "Unknown provider"),
        (status = 401, description = "Provider rejected the access token"),
        (status = 403, description = "Account is banned"),
        (status = 409, description = "Email belongs to another account"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn oauth_sign_in(
    State(state): State<AppState>,
    ApiPath(provider): ApiPath<String>,
    ApiJson(dto): ApiJson<OAuthSignInDto>,
) -> AppResult<Json<AuthResponseDto>> {
    dto.validate()?;
    let provider = AuthProvider::parse_oauth(&provider)?;

    let profile = state
        .oauth
        .fetch_profile(provider, dto.access_token.trim())
        .await?;
    let result = state.auth_service.oauth_sign_in(profile).await?;

    Ok(Json(result.into()))
}
