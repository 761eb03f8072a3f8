use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `parenthub-client`.
pub enum ParentHubClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Недостаточно прав или аккаунт заблокирован.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Запрошенный ресурс не найден.
    #[error("not found")]
    NotFound,

    /// Email или никнейм уже заняты.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или бизнес-ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Сервер вернул 5xx.
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `parenthub-client`.
pub type ParentHubClientResult<T> = Result<T, ParentHubClientError>;

impl ParentHubClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthorized,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden(message),
            reqwest::StatusCode::NOT_FOUND => Self::NotFound,
            reqwest::StatusCode::CONFLICT => Self::Conflict(message),
            status if status.is_server_error() => Self::Server(message),
            _ => Self::InvalidRequest(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::ParentHubClientError;

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            ParentHubClientError::from_http_status(StatusCode::UNAUTHORIZED, None),
            ParentHubClientError::Unauthorized
        ));
        assert!(matches!(
            ParentHubClientError::from_http_status(StatusCode::CONFLICT, Some("email".into())),
            ParentHubClientError::Conflict(message) if message == "email"
        ));
        assert!(matches!(
            ParentHubClientError::from_http_status(StatusCode::BAD_GATEWAY, None),
            ParentHubClientError::Server(_)
        ));
        assert!(matches!(
            ParentHubClientError::from_http_status(StatusCode::PAYLOAD_TOO_LARGE, None),
            ParentHubClientError::InvalidRequest(_)
        ));
    }
}
