//! Core error types for habitual-core.
//!
//! This module defines the error hierarchy using thiserror. Engine errors
//! (`RecurrenceError`) are kept separate from storage and configuration
//! errors so pure computations never drag in I/O failure modes.

use std::path::PathBuf;
use thiserror::Error;

use crate::habit::{HabitKey, OwnerKey, RecurrenceRule};

/// Core error type for habitual-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Due-date or streak computation failed
    #[error(transparent)]
    Recurrence(#[from] RecurrenceError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Requested habit does not exist for this owner
    #[error("Habit '{habit}' not found for owner '{owner}'")]
    HabitNotFound { owner: OwnerKey, habit: HabitKey },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the recurrence engine and the streak walk.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The cadence has no due-date semantics yet.
    #[error("Recurrence '{rule}' is not supported for due-date or streak computation")]
    UnsupportedRecurrence { rule: RecurrenceRule },
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: &'static str, message: String },

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Could not determine where configuration lives
    #[error("Cannot resolve data directory: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Target must be non-negative for countable and limit habits
    #[error("Invalid target {target}: targets must be zero or greater")]
    InvalidTarget { target: i64 },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },

    /// Operation not available for this habit
    #[error("{0}")]
    UnsupportedOperation(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg)
                if code.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_recurrence_names_the_rule() {
        let err = RecurrenceError::UnsupportedRecurrence {
            rule: RecurrenceRule::Custom,
        };
        assert!(err.to_string().contains("custom"));

        let core: CoreError = err.into();
        assert!(matches!(
            core,
            CoreError::Recurrence(RecurrenceError::UnsupportedRecurrence { .. })
        ));
    }

    #[test]
    fn locked_database_maps_to_locked() {
        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            None,
        );
        // SQLITE_BUSY surfaces as DatabaseBusy, not DatabaseLocked
        assert!(matches!(DatabaseError::from(err), DatabaseError::QueryFailed(_)));

        let err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
            None,
        );
        assert!(matches!(DatabaseError::from(err), DatabaseError::Locked));
    }
}
