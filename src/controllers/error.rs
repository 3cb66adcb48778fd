//! HTTP error responses for the songs API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::song::PayloadError;

/// A failed request as seen by the client.
///
/// Every error body carries a single message field. Client input errors and
/// server failures use `error`, missing songs use `message`, and a duplicate
/// create uses `Message` with a 302 Found status:
/// ```json
/// { "error": "No input data provided" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn field(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) | ApiError::Internal(_) => "error",
            ApiError::NotFound(_) => "message",
            ApiError::Conflict(_) => "Message",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg) => msg,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ self.field(): self.message() });
        (self.status(), Json(body)).into_response()
    }
}

impl From<PayloadError> for ApiError {
    fn from(err: PayloadError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}
