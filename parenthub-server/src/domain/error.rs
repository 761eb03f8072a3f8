use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum DomainError {
    #[error("validation failed for '{field}': {message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("authentication required")]
    AuthenticationRequired,

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("resource already exists: {0}")]
    AlreadyExists(String),

    #[error("forbidden")]
    Forbidden,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("upstream call failed: {0}")]
    Upstream(String),

    #[error("image processing failed: {0}")]
    ImageProcessing(String),

    #[error("unexpected domain error: {0}")]
    Unexpected(String),
}
