//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Boxed cause carried by connection failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Caller or configuration supplied an unusable value
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{0}")]
    Validation(String),

    #[error("Resource not found")]
    NotFound,

    // Directory service
    #[error("Directory connection failed: {message}")]
    DirectoryConnection {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Directory operation failed: {0}")]
    DirectoryOperation(String),

    // Mail transport
    #[error("Notification failed: {0}")]
    Notification(String),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidArgument(_) => "INVALID_ARGUMENT",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound => "NOT_FOUND",
            AppError::DirectoryConnection { .. } => "DIRECTORY_UNAVAILABLE",
            AppError::DirectoryOperation(_) => "DIRECTORY_ERROR",
            AppError::Notification(_) => "NOTIFICATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidArgument(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::DirectoryConnection { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::DirectoryOperation(_) | AppError::Notification(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::InvalidArgument(msg) | AppError::Validation(msg) => msg.clone(),

            // Hide details of upstream and internal failures
            AppError::DirectoryConnection { message, source } => {
                tracing::error!(error = %source, "{}", message);
                "The directory service is unavailable".to_string()
            }
            AppError::DirectoryOperation(msg) => {
                tracing::error!("Directory operation error: {}", msg);
                "The directory service rejected the request".to_string()
            }
            AppError::Notification(msg) => {
                tracing::error!("Notification error: {}", msg);
                "The notification could not be sent".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Convenience constructors
impl AppError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        AppError::InvalidArgument(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn directory_connection(
        msg: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        AppError::DirectoryConnection {
            message: msg.into(),
            source: source.into(),
        }
    }

    pub fn directory_operation(msg: impl Into<String>) -> Self {
        AppError::DirectoryOperation(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        AppError::Notification(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
