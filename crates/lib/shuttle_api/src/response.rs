//! Uniform JSON envelope for every response.
//!
//! ```json
//! { "success": true, "message": "Student created successfully", "data": { "id": "…" } }
//! { "success": false, "error": "validation_error", "message": "first_name is required" }
//! ```

use axum::Json;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Response envelope. `data` is omitted when absent; `error` carries a
/// machine-readable code on failures only.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T>
where
    T: Serialize,
{
    /// Success envelope carrying `data`.
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            error: None,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success envelope without a payload.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            error: None,
            message: message.into(),
            data: None,
        }
    }

    /// Failure envelope.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(code.into()),
            message: message.into(),
            data: None,
        }
    }
}

impl<T> IntoResponse for ApiResponse<T>
where
    T: Serialize,
{
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
