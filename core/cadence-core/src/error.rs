//! Error types for cadence-core operations.
//!
//! State transitions never fail; these errors only cover file I/O, parsing,
//! and the preconditions of starting or recovering a session.

use std::path::PathBuf;

use crate::types::SessionStatus;

/// All errors that can occur in cadence-core operations.
#[derive(Debug, thiserror::Error)]
pub enum CadenceError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Data directory could not be resolved")]
    DataDirNotFound,

    #[error("Configuration file malformed: {path}: {details}")]
    ConfigMalformed { path: PathBuf, details: String },

    // ─────────────────────────────────────────────────────────────────────
    // Catalog Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Workout not found: {0}")]
    WorkoutNotFound(String),

    #[error("Workout has no exercises: {0}")]
    EmptyWorkout(String),

    #[error("Backup contains neither workouts nor history: {0}")]
    InvalidBackup(PathBuf),

    // ─────────────────────────────────────────────────────────────────────
    // Session Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Snapshot is not recoverable (status {status:?})")]
    NotRecoverable { status: SessionStatus },

    #[error("Session has not finished yet")]
    SessionNotFinished,

    #[error("No workout selected and no session to resume")]
    NoWorkoutSelected,

    #[error("Not supported on this platform: {0}")]
    Unsupported(String),

    // ─────────────────────────────────────────────────────────────────────
    // I/O Errors
    // ─────────────────────────────────────────────────────────────────────
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
}

/// Convenience type alias for Results using CadenceError.
pub type Result<T> = std::result::Result<T, CadenceError>;

impl CadenceError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        CadenceError::Io {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn json(context: impl Into<String>, source: serde_json::Error) -> Self {
        CadenceError::Json {
            context: context.into(),
            source,
        }
    }
}

impl From<CadenceError> for String {
    fn from(err: CadenceError) -> String {
        err.to_string()
    }
}
