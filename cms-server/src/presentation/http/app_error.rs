use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    JsonBody(#[from] JsonRejection),

    #[error(transparent)]
    Query(#[from] QueryRejection),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl AppError {
    fn status_and_message(self) -> (StatusCode, String) {
        match self {
            AppError::Domain(err) => match &err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Unauthenticated => (StatusCode::UNAUTHORIZED, err.to_string()),
                DomainError::Unexpected(cause) => {
                    error!(%cause, "unexpected error while handling request");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                    )
                }
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::JsonBody(rejection) => (rejection.status(), rejection.body_text()),
            AppError::Query(rejection) => (rejection.status(), rejection.body_text()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = self.status_and_message();
        (status, Json(ErrorBody { error: msg })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rstest::rstest;

    use super::AppError;
    use crate::domain::error::DomainError;

    #[rstest]
    #[case::validation(DomainError::validation("title", "must be 1..255 chars"), StatusCode::BAD_REQUEST)]
    #[case::not_found(DomainError::NotFound("post id: 1".to_string()), StatusCode::NOT_FOUND)]
    #[case::conflict(DomainError::AlreadyExists("slug".to_string()), StatusCode::CONFLICT)]
    #[case::forbidden(DomainError::Forbidden, StatusCode::FORBIDDEN)]
    #[case::unauthenticated(DomainError::Unauthenticated, StatusCode::UNAUTHORIZED)]
    #[case::unexpected(DomainError::Unexpected("boom".to_string()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn domain_errors_map_to_http_status(#[case] err: DomainError, #[case] expected: StatusCode) {
        let (status, _) = AppError::from(err).status_and_message();
        assert_eq!(status, expected);
    }

    #[test]
    fn unexpected_error_does_not_leak_cause() {
        let (_, msg) =
            AppError::from(DomainError::Unexpected("db password=secret".to_string()))
                .status_and_message();
        assert_eq!(msg, "internal error");
    }
}
