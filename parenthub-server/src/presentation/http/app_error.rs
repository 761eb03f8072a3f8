use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("unauthorized")]
    Unauthorized,

    /// Extractor rejection that carries its own status.
    #[error("rejected ({status}): {message}")]
    Rejected { status: StatusCode, message: String },
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Domain(err) => match err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::AuthenticationRequired | DomainError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, err.to_string())
                }
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::Upstream(_)
                | DomainError::ImageProcessing(_)
                | DomainError::Unexpected(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Rejected { status, message } => (*status, message.clone()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }

        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::AppError;
    use crate::domain::error::DomainError;

    fn status(err: DomainError) -> StatusCode {
        AppError::from(err).status_and_message().0
    }

    #[test]
    fn domain_errors_map_to_http_statuses() {
        assert_eq!(
            status(DomainError::Validation {
                field: "title",
                message: "must not be empty"
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status(DomainError::AuthenticationRequired), StatusCode::UNAUTHORIZED);
        assert_eq!(status(DomainError::InvalidCredentials), StatusCode::UNAUTHORIZED);
        assert_eq!(status(DomainError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status(DomainError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(DomainError::AlreadyExists("email".into())), StatusCode::CONFLICT);
    }

    #[test]
    fn server_errors_hide_details() {
        let (code, message) =
            AppError::from(DomainError::Upstream("password=hunter2".into())).status_and_message();
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "internal error");

        let (code, _) =
            AppError::from(DomainError::ImageProcessing("bad jpeg".into())).status_and_message();
        assert_eq!(code, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
