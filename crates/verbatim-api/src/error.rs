//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

/// Error type returned by request handlers.
#[derive(Debug)]
pub enum ApiError {
    /// Internal failure (database, external service, configuration); the
    /// wrapped message is passed through to the response body.
    Internal(verbatim_core::Error),
    Unauthorized(String),
    NotFound(String),
    BadRequest(String),
}

impl From<verbatim_core::Error> for ApiError {
    fn from(err: verbatim_core::Error) -> Self {
        use verbatim_core::Error;
        match err {
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::TranscriptNotFound(_) => ApiError::NotFound("Transcript not found".to_string()),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::Unauthorized(msg) => ApiError::Unauthorized(msg),
            other => ApiError::Internal(other),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Internal(verbatim_core::Error::Io(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::Internal(err) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));

        (status, body).into_response()
    }
}
