//! Error types for the maintenance server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::lifecycle::{Rejection, RejectionKind};

/// Numeric error codes carried in every error body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    NotAuthenticated = 2,
    Forbidden = 3,
    NotFound = 4,
    BadValue = 5,
    InvalidState = 6,
    Duplicate = 7,
    DbFailure = 8,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// A lifecycle precondition was violated
    #[error("{0}")]
    Rejected(#[from] Rejection),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    /// Violated rule (for rejected transitions) or error category
    pub error: String,
    pub message: String,
}

impl AppError {
    fn parts(&self) -> (StatusCode, ErrorCode, String, String) {
        match self {
            AppError::Authentication(msg) => (
                StatusCode::UNAUTHORIZED,
                ErrorCode::NotAuthenticated,
                "not_authenticated".to_string(),
                msg.clone(),
            ),
            AppError::Authorization(msg) => (
                StatusCode::FORBIDDEN,
                ErrorCode::Forbidden,
                "forbidden".to_string(),
                msg.clone(),
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorCode::NotFound,
                "not_found".to_string(),
                msg.clone(),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorCode::BadValue,
                "validation".to_string(),
                msg.clone(),
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorCode::Duplicate,
                "conflict".to_string(),
                msg.clone(),
            ),
            AppError::Rejected(rejection) => {
                let (status, code) = match rejection.kind() {
                    RejectionKind::NotFound => (StatusCode::NOT_FOUND, ErrorCode::NotFound),
                    RejectionKind::Forbidden => (StatusCode::FORBIDDEN, ErrorCode::Forbidden),
                    RejectionKind::InvalidState => (StatusCode::CONFLICT, ErrorCode::InvalidState),
                    RejectionKind::Validation => (StatusCode::BAD_REQUEST, ErrorCode::BadValue),
                };
                (status, code, rejection.rule().to_string(), rejection.to_string())
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::DbFailure,
                    "database".to_string(),
                    "Database error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "internal".to_string(),
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, error, message) = self.parts();

        let body = Json(ErrorResponse {
            code: code as u32,
            error,
            message,
        });

        (status, body).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
