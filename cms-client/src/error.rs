use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `cms-client`.
pub enum CmsClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Токен отсутствует или отклонён сервером (401).
    #[error("unauthenticated")]
    Unauthenticated,

    /// Операция запрещена для текущего пользователя (403).
    #[error("forbidden")]
    Forbidden,

    /// Запрошенный ресурс не найден (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Конфликт, например занятый слаг (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или ошибка валидации (400).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Сервер вернул 5xx или неожиданный статус.
    #[error("server error: {0}")]
    Server(String),
}

/// Результат операций `cms-client`.
pub type CmsClientResult<T> = Result<T, CmsClientError>;

impl CmsClientError {
    pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| format!("http status {status}"));
        match status {
            reqwest::StatusCode::UNAUTHORIZED => Self::Unauthenticated,
            reqwest::StatusCode::FORBIDDEN => Self::Forbidden,
            reqwest::StatusCode::NOT_FOUND => Self::NotFound(message),
            reqwest::StatusCode::CONFLICT => Self::Conflict(message),
            status if status.is_client_error() => Self::InvalidRequest(message),
            _ => Self::Server(message),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None);
        }
        Self::Http(err)
    }
}
