//! Error types for Coachlog
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling. The variants carry the
//! error taxonomy shared with the rest of the fitness-coach stack.

use thiserror::Error;

/// Main error type for Coachlog operations
///
/// This enum encompasses all possible errors that can occur during
/// configuration handling, chat history persistence, and search.
#[derive(Error, Debug)]
pub enum CoachlogError {
    /// Configuration-related errors (persisting the chat config blob)
    #[error("Configuration error: {0}")]
    Config(String),

    /// General storage errors (database open, read failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Write rejected by the underlying store
    #[error("Storage full: {0}")]
    StorageFull(String),

    /// The platform denied access to the data directory
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// A persisted record could not be deserialized
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// Network errors; unused by the local store but shared with
    /// remote-backed deployments of the same client
    #[error("Network error: {0}")]
    Network(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for Coachlog operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
