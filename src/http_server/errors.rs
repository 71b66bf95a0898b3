//! # Ingestion Errors
//!
//! Maps entry and spool failures onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use crate::entry::EntryError;
use crate::spool::SpoolError;

/// Result type for ingestion handlers
pub type IngestResult<T> = Result<T, IngestError>;

#[derive(Debug, Error)]
pub enum IngestError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Malformed or invalid submission; never enqueued
    #[error(transparent)]
    Client(#[from] EntryError),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// The append failed; the caller must retry
    #[error(transparent)]
    Storage(#[from] SpoolError),

    /// The blocking append task did not complete
    #[error("internal error: {0}")]
    Internal(String),
}

impl IngestError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            IngestError::Client(_) => StatusCode::BAD_REQUEST,
            IngestError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IngestError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::Client(e) => e.code(),
            IngestError::Storage(e) => e.code(),
            IngestError::Internal(_) => "LOGSPOOL_INTERNAL",
        }
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl From<&IngestError> for ErrorResponse {
    fn from(err: &IngestError) -> Self {
        // Storage details stay in the server log
        let error = match err {
            IngestError::Client(e) => e.to_string(),
            IngestError::Storage(_) | IngestError::Internal(_) => "server error".to_string(),
        };
        Self {
            code: err.status_code().as_u16(),
            error,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(ErrorResponse::from(&self));
        (status, body).into_response()
    }
}
