use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use stowage_sdk::ServiceError;
use thiserror::Error;

/// Errors from running the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result alias for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Request-level error, mapped to an HTTP response.
///
/// Not-found maps to 404; malformed uploads to 400; every other core
/// failure collapses to a generic 500 so internal storage paths never
/// leak to clients. The full error is logged server-side.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bundle not found")]
    NotFound,

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("internal error")]
    Internal,
}

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        if e.is_not_found() {
            ApiError::NotFound
        } else {
            tracing::error!(error = %e, "request failed");
            ApiError::Internal
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "bundle not found".to_string()),
            ApiError::BadRequest(reason) => (StatusCode::BAD_REQUEST, reason.clone()),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            ),
        };
        (status, message).into_response()
    }
}
