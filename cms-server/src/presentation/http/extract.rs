use axum::extract::{FromRequest, FromRequestParts};

use crate::presentation::http::app_error::AppError;

/// `Json`, чей отказ (битый JSON, нет поля, не тот Content-Type) отдаётся
/// как `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub(crate) struct AppJson<T>(pub(crate) T);

/// `Query` с тем же форматом ошибок.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub(crate) struct AppQuery<T>(pub(crate) T);
