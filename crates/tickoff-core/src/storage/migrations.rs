//! Database schema migrations for tickoff.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult, TransactionBehavior};
use tracing::{debug, warn};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// Runs under a single IMMEDIATE transaction so that connections opening
/// the same fresh file serialize here and each re-reads the version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &mut Connection) -> SqliteResult<()> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    create_schema_version_table(&tx)?;

    let current_version = get_schema_version(&tx);

    if current_version < 1 {
        migrate_v1(&tx)?;
    }
    if current_version < 2 {
        migrate_v2(&tx)?;
    }

    tx.commit()
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!("failed to read schema_version: {e}");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    debug!(version, "schema version updated");
    Ok(())
}

/// Migration v1: todos and per-user streak records.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS todos (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL,
            title       TEXT NOT NULL,
            completed   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS streaks (
            user_id             TEXT PRIMARY KEY,
            current_streak      INTEGER NOT NULL DEFAULT 0,
            longest_streak      INTEGER NOT NULL DEFAULT 0,
            last_completed_day  TEXT,
            total_completed     INTEGER NOT NULL DEFAULT 0
        );",
    )?;

    set_schema_version(conn, 1)
}

/// Migration v2: optimistic-concurrency version on streak rows.
///
/// Adds:
/// - streaks.version: bumped on every save, compared on update
/// - index on todos(user_id) for per-user listing
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "ALTER TABLE streaks ADD COLUMN version INTEGER NOT NULL DEFAULT 1;
         CREATE INDEX IF NOT EXISTS idx_todos_user_id ON todos(user_id, created_at);",
    )?;

    set_schema_version(conn, 2)
}
