//! Web-specific error types and conversions
//!
//! Every error renders as a flat JSON body, `{"error": "<message>"}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use flaky_asr_core::SimulationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Web-specific error type for HTTP API operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebError {
    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("Too many requests: {message}")]
    TooManyRequests { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

/// JSON body of an error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;

impl WebError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            WebError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client
    pub fn message(&self) -> &str {
        match self {
            WebError::NotFound { message }
            | WebError::TooManyRequests { message }
            | WebError::Internal { message } => message,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        WebError::NotFound {
            message: message.into(),
        }
    }

    pub fn too_many_requests(message: impl Into<String>) -> Self {
        WebError::TooManyRequests {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        WebError::Internal {
            message: message.into(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorBody {
            error: self.message().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// Simulation outcomes carry details for logs; clients only see the fixed messages
impl From<SimulationError> for WebError {
    fn from(error: SimulationError) -> Self {
        match error {
            SimulationError::CapacityExceeded { .. } => WebError::too_many_requests("Too many requests"),
            SimulationError::NotFound { .. } => WebError::not_found("File not found"),
            SimulationError::SimulatedFailure { .. } => WebError::internal("Internal server error"),
        }
    }
}
