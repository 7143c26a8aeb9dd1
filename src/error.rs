use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt::Display;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Abort-class dispatch failures. These are the only errors a caller of
/// `Dispatcher::dispatch` ever sees; per-recipient delivery and persistence
/// failures are folded into the audit records instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("contact not found")]
    ContactNotFound,
    #[error("group not found")]
    GroupNotFound,
    #[error("group has no members")]
    EmptyGroup,
    #[error("invalid target type: {0}")]
    InvalidTarget(String),
    #[error("store error: {0}")]
    Store(#[from] anyhow::Error),
}

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal<E: Display>(error: E) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (status, body).into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl From<DispatchError> for AppError {
    fn from(value: DispatchError) -> Self {
        match value {
            DispatchError::ContactNotFound | DispatchError::GroupNotFound => {
                AppError::not_found(value.to_string())
            }
            DispatchError::EmptyGroup | DispatchError::InvalidTarget(_) => {
                AppError::bad_request(value.to_string())
            }
            DispatchError::Store(err) => AppError::internal(err),
        }
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        AppError::internal(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        AppError::internal(value)
    }
}
