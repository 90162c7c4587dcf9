//! Unified error handling for the API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified API error response with proper HTTP status codes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// HTTP status code.
    #[serde(skip)]
    pub status: StatusCode,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(code: impl Into<String>, message: impl Into<String>, status: StatusCode) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            status,
        }
    }

    // Common error constructors
    /// Bad request (400).
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message, StatusCode::BAD_REQUEST)
    }

    /// Not found (404).
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            "NOT_FOUND",
            format!("{} not found", resource.into()),
            StatusCode::NOT_FOUND,
        )
    }

    /// Conflict (409).
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new("CONFLICT", message, StatusCode::CONFLICT)
    }

    /// Internal server error (500).
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message, StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Upstream engine failure (502).
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new("UPSTREAM_ERROR", message, StatusCode::BAD_GATEWAY)
    }

    /// Service unavailable (503).
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(
            "SERVICE_UNAVAILABLE",
            message,
            StatusCode::SERVICE_UNAVAILABLE,
        )
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        let status = self.status;
        let body = serde_json::json!({
            "success": false,
            "error": {
                "code": self.code,
                "message": self.message,
            },
            "message": self.message,
        });
        (status, axum::Json(body)).into_response()
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

/// Conversion from domain error types.

impl From<alphamind_storage::Error> for ErrorResponse {
    fn from(e: alphamind_storage::Error) -> Self {
        use alphamind_storage::Error;
        match e {
            Error::NotFound(msg) => Self::new("NOT_FOUND", msg, StatusCode::NOT_FOUND),
            Error::Conflict(msg) => Self::conflict(msg),
            Error::InvalidInput(msg) => Self::bad_request(msg),
            Error::InvalidTransition { .. } => Self::conflict(e.to_string()),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<alphamind_workflow::WorkflowError> for ErrorResponse {
    fn from(e: alphamind_workflow::WorkflowError) -> Self {
        use alphamind_workflow::WorkflowError;
        match e {
            WorkflowError::Network(msg) => Self::upstream(format!("Engine unreachable: {}", msg)),
            WorkflowError::Engine { status, body } => {
                Self::upstream(format!("Engine returned HTTP {}: {}", status, body))
            }
            WorkflowError::InvalidInput(msg) => Self::bad_request(msg),
            WorkflowError::Storage(e) => e.into(),
            other => Self::internal(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for ErrorResponse {
    fn from(e: anyhow::Error) -> Self {
        Self::internal(e.to_string())
    }
}
