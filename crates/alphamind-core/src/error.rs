//! Unified error handling for AlphaMind.
//!
//! This module provides a common error type that can be used across all crates,
//! reducing boilerplate and making error handling consistent.

/// Unified error type for AlphaMind.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Storage/database errors.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Validation errors.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflict errors (e.g. duplicate unique field).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Workflow-related errors.
    #[error("Workflow error: {0}")]
    Workflow(String),

    /// Network-related errors.
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout errors.
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Serialization/deserialization errors.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;
