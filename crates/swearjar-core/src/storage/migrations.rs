//! Database schema migrations.
//!
//! Migrations are versioned and applied automatically when opening the
//! database. The `schema_version` table tracks the current migration
//! version.

use rusqlite::{Connection, Result as SqliteResult};

/// Apply all pending migrations to bring the database to the current
/// schema version.
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
fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or(0)
}

/// Migration v1: baseline schema.
///
/// Seven entity tables plus the kv table. Cascades are done as explicit
/// multi-table deletes inside one transaction rather than FK pragmas, so
/// the foreign keys here are plain columns. The partial unique index on
/// streak_history enforces the at-most-one-current-streak invariant at
/// the storage level.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS users (
            id            TEXT PRIMARY KEY,
            username      TEXT NOT NULL UNIQUE,
            display_name  TEXT,
            created_at    TEXT NOT NULL,
            last_active   TEXT NOT NULL,
            streak_days   INTEGER NOT NULL DEFAULT 0,
            total_swears  INTEGER NOT NULL DEFAULT 0,
            total_fine    REAL NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS swear_words (
            id            TEXT PRIMARY KEY,
            word          TEXT NOT NULL UNIQUE,
            severity      TEXT NOT NULL,
            default_fine  REAL NOT NULL,
            is_custom     INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS user_words (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            word_id       TEXT NOT NULL,
            custom_fine   REAL,
            is_active     INTEGER NOT NULL DEFAULT 1,
            UNIQUE(user_id, word_id)
        );

        CREATE TABLE IF NOT EXISTS swear_logs (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            word_id       TEXT NOT NULL,
            timestamp     TEXT NOT NULL,
            local_date    TEXT NOT NULL,
            mood          TEXT,
            worth_it      INTEGER,
            context       TEXT,
            fine_amount   REAL NOT NULL,
            location      TEXT
        );

        CREATE TABLE IF NOT EXISTS user_settings (
            user_id               TEXT PRIMARY KEY,
            notifications_enabled INTEGER NOT NULL DEFAULT 1,
            dark_mode             INTEGER NOT NULL DEFAULT 0,
            reminder_time         TEXT,
            share_stats           INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS streak_history (
            id            TEXT PRIMARY KEY,
            user_id       TEXT NOT NULL,
            streak_length INTEGER NOT NULL,
            start_date    TEXT NOT NULL,
            end_date      TEXT,
            is_current    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS daily_summaries (
            id                  TEXT PRIMARY KEY,
            user_id             TEXT NOT NULL,
            date                TEXT NOT NULL,
            swear_count         INTEGER NOT NULL DEFAULT 0,
            total_fine          REAL NOT NULL DEFAULT 0,
            most_common_word_id TEXT,
            most_common_mood    TEXT,
            is_clean_day        INTEGER NOT NULL,
            UNIQUE(user_id, date)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_swear_logs_user_ts
            ON swear_logs(user_id, timestamp);
        CREATE INDEX IF NOT EXISTS idx_swear_logs_user_date
            ON swear_logs(user_id, local_date);
        CREATE INDEX IF NOT EXISTS idx_daily_summaries_user_date
            ON daily_summaries(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_streak_history_user
            ON streak_history(user_id);
        CREATE UNIQUE INDEX IF NOT EXISTS idx_streak_history_current
            ON streak_history(user_id) WHERE is_current = 1;",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (1)", [])?;

    tx.commit()?;
    Ok(())
}

/// Migration v2: location tagging.
///
/// Adds the auto-location toggle to user_settings. The swear_logs
/// location column shipped in v1.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "ALTER TABLE user_settings ADD COLUMN auto_location INTEGER NOT NULL DEFAULT 0;",
    )?;

    tx.execute("DELETE FROM schema_version", [])?;
    tx.execute("INSERT INTO schema_version (version) VALUES (2)", [])?;

    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);

        // v2 column exists
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('user_settings')
                 WHERE name = 'auto_location'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn migrate_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), 2);
    }

    #[test]
    fn single_current_streak_enforced() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();

        conn.execute(
            "INSERT INTO streak_history (id, user_id, streak_length, start_date, is_current)
             VALUES ('s1', 'u1', 1, '2024-01-01T00:00:00Z', 1)",
            [],
        )
        .unwrap();
        let second = conn.execute(
            "INSERT INTO streak_history (id, user_id, streak_length, start_date, is_current)
             VALUES ('s2', 'u1', 1, '2024-01-02T00:00:00Z', 1)",
            [],
        );
        assert!(second.is_err(), "two current streaks for one user");

        // Closed rows are not constrained
        conn.execute(
            "INSERT INTO streak_history (id, user_id, streak_length, start_date, is_current)
             VALUES ('s3', 'u1', 4, '2023-12-01T00:00:00Z', 0)",
            [],
        )
        .unwrap();
    }
}
