use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use crate::resolve::ResolveError;

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    details: String,
}

/// Wire-level failure: a stable machine-readable code plus a human-readable
/// detail. Raw upstream payloads and stack traces never leave the process.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    details: String,
}

impl From<ResolveError> for ApiError {
    fn from(e: ResolveError) -> Self {
        let (status, code) = match &e {
            ResolveError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "URL_REQUIRED"),
            ResolveError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            ResolveError::ExtractionFailed(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "EXTRACTION_FAILED")
            }
            ResolveError::AllProvidersOffline | ResolveError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "SYSTEM_FAILURE")
            }
        };

        let details = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("resolution failed: {}", e);
            "the extraction providers are overloaded or unreachable, try again shortly".to_string()
        } else {
            e.to_string()
        };

        Self {
            status,
            code,
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.code,
                details: self.details,
            }),
        )
            .into_response()
    }
}
