//! Error-to-response mapping
//!
//! Every handler returns the common error type; this wrapper turns each
//! variant into the status code the API contract promises. Conflict-class
//! rejections keep their message (it names the blocking slot) so the
//! front end can surface the reason verbatim.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use djp_common::Error;
use serde_json::json;
use tracing::error;

/// Handler result carrying the common error type
pub type ApiResult<T> = Result<T, ApiError>;

/// Wrapper giving the common error an HTTP shape
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) | Error::PastDate(_) => StatusCode::BAD_REQUEST,
            Error::NotAvailable(_)
            | Error::SlotConflict(_)
            | Error::CompleteNightConflict(_)
            | Error::DuplicateIdentity(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Database(_) | Error::Io(_) | Error::Config(_) | Error::Internal(_) => {
                error!("Request failed: {}", self.0);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match status {
            // Internal detail stays in the log, not the response
            StatusCode::INTERNAL_SERVER_ERROR => "internal error".to_string(),
            _ => self.0.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
