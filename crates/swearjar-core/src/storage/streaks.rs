//! StreakHistory row queries.
//!
//! State transitions live in `crate::streak`; this module only knows how
//! to read and write rows.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::users::parse_datetime;
use crate::error::StoreError;
use crate::model::StreakHistory;

fn row_to_streak(row: &rusqlite::Row) -> Result<StreakHistory, rusqlite::Error> {
    let end_date: Option<String> = row.get("end_date")?;
    Ok(StreakHistory {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        streak_length: row.get("streak_length")?,
        start_date: parse_datetime(&row.get::<_, String>("start_date")?)?,
        end_date: end_date.as_deref().map(parse_datetime).transpose()?,
        is_current: row.get("is_current")?,
    })
}

pub(crate) fn insert_streak(conn: &Connection, streak: &StreakHistory) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO streak_history (id, user_id, streak_length, start_date, end_date, is_current)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            streak.id,
            streak.user_id,
            streak.streak_length,
            streak.start_date.to_rfc3339(),
            streak.end_date.map(|d| d.to_rfc3339()),
            streak.is_current,
        ],
    )?;
    Ok(())
}

/// The user's active streak row, if any. At most one exists.
pub(crate) fn current_streak(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<StreakHistory>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM streak_history WHERE user_id = ?1 AND is_current = 1")?
        .query_row(params![user_id], row_to_streak)
        .optional()?)
}

pub(crate) fn increment_streak(conn: &Connection, streak_id: &str) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE streak_history SET streak_length = streak_length + 1 WHERE id = ?1",
        params![streak_id],
    )?;
    Ok(())
}

/// Close a streak row: freeze its length, stamp the end, clear the flag.
pub(crate) fn close_streak(
    conn: &Connection,
    streak_id: &str,
    ended_at: DateTime<Utc>,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE streak_history SET end_date = ?2, is_current = 0 WHERE id = ?1",
        params![streak_id, ended_at.to_rfc3339()],
    )?;
    Ok(())
}

/// Longest streak across all rows, current or historical. Zero when the
/// user has no streak rows at all.
pub(crate) fn longest_streak(conn: &Connection, user_id: &str) -> Result<u32, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(streak_length), 0) FROM streak_history WHERE user_id = ?1",
        params![user_id],
        |row| row.get(0),
    )?)
}

pub(crate) fn list_streaks(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<StreakHistory>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM streak_history WHERE user_id = ?1 ORDER BY start_date DESC",
    )?;
    let streaks = stmt
        .query_map(params![user_id], row_to_streak)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(streaks)
}
