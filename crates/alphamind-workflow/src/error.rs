//! Error types for the workflow crate.

use thiserror::Error;

/// Result type for workflow operations.
pub type Result<T> = std::result::Result<T, WorkflowError>;

/// Workflow error types.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// Transport-level failure talking to the engine (connect, timeout, TLS).
    #[error("Engine unreachable: {0}")]
    Network(String),

    /// The engine answered with a non-success status.
    #[error("Engine returned HTTP {status}: {body}")]
    Engine { status: u16, body: String },

    /// Payload could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Underlying store failure.
    #[error(transparent)]
    Storage(#[from] alphamind_storage::Error),

    /// Invalid caller input.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for WorkflowError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            WorkflowError::Serialization(e.to_string())
        } else {
            WorkflowError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for WorkflowError {
    fn from(e: serde_json::Error) -> Self {
        WorkflowError::Serialization(e.to_string())
    }
}

impl From<WorkflowError> for alphamind_core::Error {
    fn from(e: WorkflowError) -> Self {
        match e {
            WorkflowError::Network(s) => alphamind_core::Error::Network(s),
            WorkflowError::Engine { status, body } => {
                alphamind_core::Error::Workflow(format!("HTTP {}: {}", status, body))
            }
            WorkflowError::Serialization(s) => alphamind_core::Error::Serialization(s),
            WorkflowError::Storage(e) => e.into(),
            WorkflowError::InvalidInput(s) => alphamind_core::Error::Validation(s),
        }
    }
}
