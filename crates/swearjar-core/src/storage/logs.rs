//! SwearLog queries.
//!
//! Per-day fetches key off the `local_date` column captured at log time,
//! never off raw instant comparison.

use rusqlite::{params, Connection, OptionalExtension};

use super::users::parse_datetime;
use crate::error::StoreError;
use crate::model::{Mood, SwearLog};

pub(crate) fn row_to_log(row: &rusqlite::Row) -> Result<SwearLog, rusqlite::Error> {
    let mood: Option<String> = row.get("mood")?;
    Ok(SwearLog {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        word_id: row.get("word_id")?,
        timestamp: parse_datetime(&row.get::<_, String>("timestamp")?)?,
        local_date: row.get("local_date")?,
        mood: mood.as_deref().map(Mood::parse),
        worth_it: row.get("worth_it")?,
        context: row.get("context")?,
        fine_amount: row.get("fine_amount")?,
        location: row.get("location")?,
    })
}

pub(crate) fn insert_log(conn: &Connection, entry: &SwearLog) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO swear_logs (id, user_id, word_id, timestamp, local_date,
                                 mood, worth_it, context, fine_amount, location)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            entry.id,
            entry.user_id,
            entry.word_id,
            entry.timestamp.to_rfc3339(),
            entry.local_date,
            entry.mood.map(|m| m.as_str()),
            entry.worth_it,
            entry.context,
            entry.fine_amount,
            entry.location,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_log(conn: &Connection, id: &str) -> Result<Option<SwearLog>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM swear_logs WHERE id = ?1")?
        .query_row(params![id], row_to_log)
        .optional()?)
}

/// Set the after-the-fact worth-it verdict on a log.
pub(crate) fn update_worth_it(
    conn: &Connection,
    log_id: &str,
    worth_it: bool,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE swear_logs SET worth_it = ?2 WHERE id = ?1",
        params![log_id, worth_it],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("log", log_id));
    }
    Ok(())
}

/// All of a user's logs for one local calendar day, in timestamp order.
///
/// The ordering makes downstream aggregation tie-breaks deterministic.
pub(crate) fn logs_for_day(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<Vec<SwearLog>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM swear_logs
         WHERE user_id = ?1 AND local_date = ?2
         ORDER BY timestamp, id",
    )?;
    let logs = stmt
        .query_map(params![user_id, date], row_to_log)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

pub(crate) fn has_logs_on_day(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<bool, StoreError> {
    Ok(conn
        .prepare("SELECT 1 FROM swear_logs WHERE user_id = ?1 AND local_date = ?2")?
        .exists(params![user_id, date])?)
}

/// Most recent logs first.
pub(crate) fn recent_logs(
    conn: &Connection,
    user_id: &str,
    limit: u32,
) -> Result<Vec<SwearLog>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM swear_logs
         WHERE user_id = ?1
         ORDER BY timestamp DESC, id DESC
         LIMIT ?2",
    )?;
    let logs = stmt
        .query_map(params![user_id, limit], row_to_log)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(logs)
}

pub(crate) fn delete_log(conn: &Connection, log_id: &str) -> Result<(), StoreError> {
    let changed = conn.execute("DELETE FROM swear_logs WHERE id = ?1", params![log_id])?;
    if changed == 0 {
        return Err(StoreError::not_found("log", log_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::local_day;
    use crate::storage::Database;
    use chrono::Utc;
    use uuid::Uuid;

    fn make_log(user_id: &str, word_id: &str, fine: f64) -> SwearLog {
        let now = Utc::now();
        SwearLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            word_id: word_id.to_string(),
            timestamp: now,
            local_date: local_day(now),
            mood: Some(Mood::Stressed),
            worth_it: None,
            context: None,
            fine_amount: fine,
            location: None,
        }
    }

    #[test]
    fn insert_and_fetch_by_day() {
        let db = Database::open_memory().unwrap();
        let entry = make_log("u1", "w1", 0.25);
        insert_log(db.conn(), &entry).unwrap();

        let logs = logs_for_day(db.conn(), "u1", &entry.local_date).unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].id, entry.id);
        assert_eq!(logs[0].mood, Some(Mood::Stressed));
        assert!(has_logs_on_day(db.conn(), "u1", &entry.local_date).unwrap());
        assert!(!has_logs_on_day(db.conn(), "u1", "1999-01-01").unwrap());
    }

    #[test]
    fn worth_it_mutable_after_creation() {
        let db = Database::open_memory().unwrap();
        let entry = make_log("u1", "w1", 0.25);
        insert_log(db.conn(), &entry).unwrap();

        update_worth_it(db.conn(), &entry.id, true).unwrap();
        let fetched = get_log(db.conn(), &entry.id).unwrap().unwrap();
        assert_eq!(fetched.worth_it, Some(true));

        let err = update_worth_it(db.conn(), "missing", false).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn delete_removes_the_row() {
        let db = Database::open_memory().unwrap();
        let entry = make_log("u1", "w1", 0.25);
        insert_log(db.conn(), &entry).unwrap();

        delete_log(db.conn(), &entry.id).unwrap();
        assert!(get_log(db.conn(), &entry.id).unwrap().is_none());

        let err = delete_log(db.conn(), &entry.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn recent_logs_limited_and_ordered() {
        let db = Database::open_memory().unwrap();
        for i in 0..5 {
            let mut entry = make_log("u1", "w1", 0.25);
            entry.timestamp = Utc::now() + chrono::Duration::seconds(i);
            insert_log(db.conn(), &entry).unwrap();
        }
        let logs = recent_logs(db.conn(), "u1", 3).unwrap();
        assert_eq!(logs.len(), 3);
        assert!(logs[0].timestamp >= logs[1].timestamp);
        assert!(logs[1].timestamp >= logs[2].timestamp);
    }
}
