//! Error handling module for the masjid site backend.
//!
//! Provides centralized error types with mapping to HTTP status codes and JSON error bodies.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const UPLOAD_REJECTED: &str = "UPLOAD_REJECTED";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad password, or missing/mismatched bearer token
    #[error("{0}")]
    Unauthorized(String),
    /// No record with the requested id
    #[error("{0}")]
    NotFound(String),
    /// Missing or malformed required field
    #[error("{0}")]
    Validation(String),
    /// Upload with a disallowed type or over the size ceiling
    #[error("{0}")]
    UploadRejected(String),
    /// Malformed request
    #[error("{0}")]
    BadRequest(String),
    /// Disk I/O failure or unreadable data file
    #[error("{0}")]
    Storage(String),
    /// Internal server error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::UploadRejected(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::UploadRejected(_) => codes::UPLOAD_REJECTED,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Storage(_) => codes::STORAGE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Wrap a failed disk operation on `path`.
    pub fn storage(action: &str, path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        tracing::error!("Failed to {} {}: {}", action, path.display(), err);
        AppError::Storage(format!("Failed to {} {}: {}", action, path.display(), err))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// JSON body of every error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}
