//! Database schema migrations for habitual.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }

    Ok(())
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
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: habits and their completions.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS habits (
            owner           TEXT NOT NULL,
            key             TEXT NOT NULL,
            name            TEXT NOT NULL,
            recurrence_rule TEXT NOT NULL DEFAULT 'daily',
            start_date      TEXT NOT NULL,
            value_kind      TEXT NOT NULL DEFAULT 'binary',
            target          INTEGER,
            tracked         INTEGER NOT NULL DEFAULT 1,
            created_at      TEXT NOT NULL,
            PRIMARY KEY (owner, key)
        );

        CREATE TABLE IF NOT EXISTS completions (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            owner       TEXT NOT NULL,
            habit_key   TEXT NOT NULL,
            occurred_at TEXT NOT NULL,
            value       INTEGER,
            FOREIGN KEY (owner, habit_key) REFERENCES habits(owner, key) ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_completions_habit ON completions(owner, habit_key);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: store the local calendar date of each completion.
///
/// Same-day lookups (toggling a binary habit) then avoid parsing every
/// timestamp. Existing rows are backfilled from the date prefix of their
/// RFC 3339 timestamp, which is the date in the recorded offset.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE completions ADD COLUMN local_date TEXT NOT NULL DEFAULT '';
         UPDATE completions SET local_date = substr(occurred_at, 1, 10) WHERE local_date = '';
         CREATE INDEX IF NOT EXISTS idx_completions_habit_date
             ON completions(owner, habit_key, local_date);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}
