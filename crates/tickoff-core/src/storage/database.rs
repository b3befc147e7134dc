//! SQLite-based storage for todos and streak records.
//!
//! Provides persistent storage for:
//! - Todo items, scoped by user
//! - One streak record per user, guarded by a version column

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, warn};

use super::{data_dir, migrations, StreakStore, TodoStore, Versioned};
use crate::error::{DatabaseError, StoreError};
use crate::streak::StreakRecord;
use crate::todo::Todo;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// Default wait before SQLITE_BUSY is reported.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(5_000);

/// SQLite database for todos and streaks.
pub struct Database {
    conn: Connection,
}

fn parse_day(column: &'static str, value: Option<String>) -> Result<Option<NaiveDate>, DatabaseError> {
    value
        .map(|s| {
            NaiveDate::parse_from_str(&s, DAY_FORMAT)
                .map_err(|_| DatabaseError::Corrupt { column, value: s })
        })
        .transpose()
}

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| {
            warn!(value = dt_str, "unparseable todo timestamp, using now");
            Utc::now()
        })
}

fn migrate(conn: &mut Connection) -> Result<(), DatabaseError> {
    migrations::migrate(conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))
}

fn row_to_todo(row: &rusqlite::Row) -> Result<Todo, rusqlite::Error> {
    let created_at: String = row.get(4)?;
    Ok(Todo {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        completed: row.get(3)?,
        created_at: parse_datetime_fallback(&created_at),
    })
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `<data_dir>/tickoff.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let dir = data_dir().map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
        Self::open_at(&dir.join("tickoff.db"), busy_timeout)
    }

    /// Open (or create) the database at an explicit path.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open_at(path: &Path, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let mut conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        conn.busy_timeout(busy_timeout)?;
        migrate(&mut conn)?;
        debug!(path = %path.display(), "database opened");
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let mut conn = Connection::open_in_memory()?;
        migrate(&mut conn)?;
        Ok(Self { conn })
    }

    /// All users that have a streak record.
    pub fn list_streak_users(&self) -> Result<Vec<String>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT user_id FROM streaks ORDER BY user_id")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

impl StreakStore for Database {
    fn load(&self, user_id: &str) -> Result<Option<Versioned<StreakRecord>>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT current_streak, longest_streak, last_completed_day, total_completed, version
                 FROM streaks WHERE user_id = ?1",
                params![user_id],
                |row| {
                    Ok((
                        row.get::<_, u32>(0)?,
                        row.get::<_, u32>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, u64>(3)?,
                        row.get::<_, i64>(4)?,
                    ))
                },
            )
            .optional()?;

        let Some((current, longest, last, total, version)) = row else {
            return Ok(None);
        };

        Ok(Some(Versioned {
            value: StreakRecord {
                user_id: user_id.to_string(),
                current_streak: current,
                longest_streak: longest,
                last_completed_day: parse_day("last_completed_day", last)?,
                total_completed: total,
            },
            version,
        }))
    }

    fn save(
        &self,
        record: &StreakRecord,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError> {
        let last = record
            .last_completed_day
            .map(|d| d.format(DAY_FORMAT).to_string());

        let (changed, new_version) = match expected_version {
            None => {
                let changed = self.conn.execute(
                    "INSERT INTO streaks
                        (user_id, current_streak, longest_streak, last_completed_day, total_completed, version)
                     VALUES (?1, ?2, ?3, ?4, ?5, 1)
                     ON CONFLICT(user_id) DO NOTHING",
                    params![
                        record.user_id,
                        record.current_streak,
                        record.longest_streak,
                        last,
                        record.total_completed,
                    ],
                )?;
                (changed, 1)
            }
            Some(version) => {
                let changed = self.conn.execute(
                    "UPDATE streaks
                     SET current_streak = ?2, longest_streak = ?3, last_completed_day = ?4,
                         total_completed = ?5, version = version + 1
                     WHERE user_id = ?1 AND version = ?6",
                    params![
                        record.user_id,
                        record.current_streak,
                        record.longest_streak,
                        last,
                        record.total_completed,
                        version,
                    ],
                )?;
                (changed, version + 1)
            }
        };

        if changed == 0 {
            warn!(user_id = %record.user_id, ?expected_version, "streak save lost a version race");
            return Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
            });
        }
        Ok(new_version)
    }
}

impl TodoStore for Database {
    fn insert_todo(&self, todo: &Todo) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT INTO todos (id, user_id, title, completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                todo.id,
                todo.user_id,
                todo.title,
                todo.completed,
                todo.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get_todo(&self, user_id: &str, id: &str) -> Result<Option<Todo>, DatabaseError> {
        Ok(self
            .conn
            .query_row(
                "SELECT id, user_id, title, completed, created_at
                 FROM todos WHERE id = ?1 AND user_id = ?2",
                params![id, user_id],
                row_to_todo,
            )
            .optional()?)
    }

    fn list_todos(&self, user_id: &str) -> Result<Vec<Todo>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, user_id, title, completed, created_at
             FROM todos WHERE user_id = ?1
             ORDER BY created_at, rowid",
        )?;
        let rows = stmt.query_map(params![user_id], row_to_todo)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn update_todo(&self, todo: &Todo, was_completed: bool) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE todos SET title = ?3, completed = ?4
             WHERE id = ?1 AND user_id = ?2 AND completed = ?5",
            params![todo.id, todo.user_id, todo.title, todo.completed, was_completed],
        )?;
        Ok(changed > 0)
    }

    fn delete_todo(&self, user_id: &str, id: &str) -> Result<bool, DatabaseError> {
        let changed = self.conn.execute(
            "DELETE FROM todos WHERE id = ?1 AND user_id = ?2",
            params![id, user_id],
        )?;
        Ok(changed > 0)
    }
}
