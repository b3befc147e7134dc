mod config;
pub mod database;
pub mod migrations;

pub use config::{ClockConfig, Config, StorageConfig, StreakConfig, UserConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::{DatabaseError, StoreError};
use crate::streak::StreakRecord;
use crate::todo::Todo;

/// A stored value together with the version it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    pub value: T,
    pub version: i64,
}

/// Persistence for per-user streak records.
///
/// Implementations must make `save` conditional on the version handed out
/// by `load`, so that two interleaved load/mutate/save cycles for the same
/// user cannot both succeed.
pub trait StreakStore {
    /// Load the record for `user_id`, if one exists.
    fn load(&self, user_id: &str) -> Result<Option<Versioned<StreakRecord>>, StoreError>;

    /// Persist `record`. `expected_version` is the version returned by
    /// `load`, or `None` if no record existed. Returns the new version.
    ///
    /// # Errors
    /// Returns [`StoreError::Conflict`] if the stored version moved.
    fn save(&self, record: &StreakRecord, expected_version: Option<i64>)
        -> Result<i64, StoreError>;
}

/// Persistence for todo items, scoped by owner.
pub trait TodoStore {
    fn insert_todo(&self, todo: &Todo) -> Result<(), DatabaseError>;

    fn get_todo(&self, user_id: &str, id: &str) -> Result<Option<Todo>, DatabaseError>;

    fn list_todos(&self, user_id: &str) -> Result<Vec<Todo>, DatabaseError>;

    /// Write title and completion state, but only if the stored completion
    /// flag still equals `was_completed`. Returns whether a row was written.
    fn update_todo(&self, todo: &Todo, was_completed: bool) -> Result<bool, DatabaseError>;

    /// Returns whether a row was deleted.
    fn delete_todo(&self, user_id: &str, id: &str) -> Result<bool, DatabaseError>;
}

/// Returns the data directory, creating it if needed.
///
/// `TICKOFF_DATA_DIR` wins if set. Otherwise `~/.config/tickoff[-dev]/`,
/// where TICKOFF_ENV=dev selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, std::io::Error> {
    let dir = match std::env::var_os("TICKOFF_DATA_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("TICKOFF_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("tickoff-dev")
            } else {
                base_dir.join("tickoff")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
