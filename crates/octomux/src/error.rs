// HTTP mapping for core errors.
//
// Resolution problems are the caller's fault (400); anything involving
// the device or lifecycle is surfaced as 503 so clients know to retry.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use octomux_core::CoreError;

/// Wrapper turning [`CoreError`] into an HTTP response.
#[derive(Debug, Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub CoreError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let core = self.0;

        let (status, error, message) = if core.is_caller_error() {
            (StatusCode::BAD_REQUEST, "invalid_request", core.to_string())
        } else {
            match core {
                CoreError::NotInitialized
                | CoreError::Http { .. }
                | CoreError::Network { .. }
                | CoreError::Timeout { .. } => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "matrix_unavailable",
                    format!("Matrix communication error: {core}"),
                ),
                other => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    other.to_string(),
                ),
            }
        };

        (status, Json(ErrorBody { error, message })).into_response()
    }
}
