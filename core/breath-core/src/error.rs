//! Error types for breath-core operations.

use std::path::PathBuf;

use crate::types::RunState;

/// All errors that can occur in breath-core operations.
#[derive(Debug, thiserror::Error)]
pub enum BreathError {
    // ─────────────────────────────────────────────────────────────────────
    // Exercise Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Invalid exercise {id:?}: {reason}")]
    InvalidExercise { id: String, reason: String },

    #[error("Exercise not found: {0}")]
    ExerciseNotFound(String),

    // ─────────────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Cannot {operation} a session in state {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: RunState,
    },

    /// `advance()` was reached while the step still had time left.
    /// Always a scheduling bug, never a user-facing condition.
    #[error("Step advanced with {countdown}s still on the countdown")]
    DoubleAdvance { countdown: u32 },

    #[error("Invalid session option: {0}")]
    InvalidOption(String),

    // ─────────────────────────────────────────────────────────────────────
    // Storage Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON parsing error: {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage write failed: {path}: {details}")]
    StorageWriteFailed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Notification Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Notification delivery failed: {0}")]
    NotificationFailed(String),
}

/// Convenience type alias for Results using BreathError.
pub type Result<T> = std::result::Result<T, BreathError>;

impl From<BreathError> for String {
    fn from(err: BreathError) -> String {
        err.to_string()
    }
}
