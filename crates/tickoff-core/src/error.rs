//! Core error types for tickoff-core.
//!
//! This module defines the error hierarchy using thiserror. The streak
//! engine itself only fails on backdated events; everything else comes from
//! its collaborators (storage, configuration, input validation).

use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// Core error type for tickoff-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Streak engine rejected the event
    #[error("Streak error: {0}")]
    Streak(#[from] StreakError),

    /// Entity does not exist or belongs to another user
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// Optimistic update kept losing against concurrent writers
    #[error("Concurrent update for user '{user_id}' did not settle after {attempts} attempts")]
    Conflict { user_id: String, attempts: u32 },

    /// A todo's completion state changed between read and write
    #[error("Todo '{id}' was modified concurrently")]
    TodoConflict { id: String },
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

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored value could not be decoded
    #[error("Corrupt value in column '{column}': {value}")]
    Corrupt { column: &'static str, value: String },
}

/// Errors returned by a [`crate::storage::StreakStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// The stored version no longer matches the one that was loaded
    #[error("Streak record for '{user_id}' was modified concurrently")]
    Conflict { user_id: String },

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Errors produced by the streak engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreakError {
    /// Completion day lies before the last recorded completion day
    #[error("Completion on {today} is earlier than last completion on {last}")]
    Backdated { today: NaiveDate, last: NaiveDate },
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

    /// Unknown dot-path key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Todo title is empty after trimming
    #[error("Title is required")]
    EmptyTitle,

    /// Calendar day could not be parsed
    #[error("Invalid calendar day '{value}': expected YYYY-MM-DD")]
    InvalidDay { value: String },

    /// User identifier is empty
    #[error("User id is required")]
    EmptyUserId,
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.into())
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict { user_id } => CoreError::Conflict {
                user_id,
                attempts: 1,
            },
            StoreError::Database(e) => CoreError::Database(e),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
