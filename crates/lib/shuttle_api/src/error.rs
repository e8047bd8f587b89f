//! Application error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use shuttle_core::auth::AuthError;
use shuttle_core::store::StoreError;
use thiserror::Error;
use tracing::error;

use crate::response::ApiResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database unavailable: {0}")]
    DbUnavailable(String),

    /// Detail is logged, never sent to the client.
    #[error("Internal server error: {detail}")]
    Internal { message: String, detail: String },
}

impl AppError {
    /// Internal error with the client-facing `message` and a logged `detail`.
    pub fn internal(message: impl Into<String>, detail: impl ToString) -> Self {
        AppError::Internal {
            message: message.into(),
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::DbUnavailable(m) => {
                error!(detail = %m, "storage unavailable");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "db_unavailable",
                    "Service temporarily unavailable",
                )
            }
            AppError::Internal { message, detail } => {
                error!(%detail, "{message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    message.as_str(),
                )
            }
        };
        (status, ApiResponse::error(code, message)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(m) => AppError::NotFound(m),
            StoreError::Conflict(m) => AppError::Conflict(m),
            StoreError::Unavailable(m) => AppError::DbUnavailable(m),
            StoreError::DbError(e) => AppError::internal("Internal server error", e),
            StoreError::Internal(m) => AppError::internal("Internal server error", m),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::TokenError(_) => AppError::Unauthorized("Invalid token".into()),
        }
    }
}
