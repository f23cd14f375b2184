//! DailySummary queries.
//!
//! All range and window filters compare `YYYY-MM-DD` date strings;
//! lexicographic order on those strings is chronological order by
//! construction.

use chrono::{Duration, Local};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::{DailySummary, Mood};

fn row_to_summary(row: &rusqlite::Row) -> Result<DailySummary, rusqlite::Error> {
    let mood: Option<String> = row.get("most_common_mood")?;
    Ok(DailySummary {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        date: row.get("date")?,
        swear_count: row.get("swear_count")?,
        total_fine: row.get("total_fine")?,
        most_common_word_id: row.get("most_common_word_id")?,
        most_common_mood: mood.as_deref().map(Mood::parse),
        is_clean_day: row.get("is_clean_day")?,
    })
}

/// Insert or update the summary row for (user, date).
///
/// The unique (user_id, date) constraint makes this safe to run any
/// number of times; an update keeps the existing row id.
pub(crate) fn upsert_summary(conn: &Connection, summary: &DailySummary) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO daily_summaries (id, user_id, date, swear_count, total_fine,
                                      most_common_word_id, most_common_mood, is_clean_day)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(user_id, date) DO UPDATE SET
             swear_count = excluded.swear_count,
             total_fine = excluded.total_fine,
             most_common_word_id = excluded.most_common_word_id,
             most_common_mood = excluded.most_common_mood,
             is_clean_day = excluded.is_clean_day",
        params![
            summary.id,
            summary.user_id,
            summary.date,
            summary.swear_count,
            summary.total_fine,
            summary.most_common_word_id,
            summary.most_common_mood.map(|m| m.as_str()),
            summary.is_clean_day,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_summary(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<Option<DailySummary>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM daily_summaries WHERE user_id = ?1 AND date = ?2")?
        .query_row(params![user_id, date], row_to_summary)
        .optional()?)
}

/// Summaries for dates in [start, end], ascending.
pub(crate) fn summaries_in_range(
    conn: &Connection,
    user_id: &str,
    start: &str,
    end: &str,
) -> Result<Vec<DailySummary>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT * FROM daily_summaries
         WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date",
    )?;
    let summaries = stmt
        .query_map(params![user_id, start, end], row_to_summary)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(summaries)
}

pub(crate) fn clean_day_count(conn: &Connection, user_id: &str) -> Result<u64, StoreError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM daily_summaries WHERE user_id = ?1 AND is_clean_day = 1",
        params![user_id],
        |row| row.get(0),
    )?)
}

/// Inclusive lower bound for a trailing window of `days` local days.
fn window_start(days: u32) -> String {
    let cutoff = Local::now().date_naive() - Duration::days(i64::from(days.saturating_sub(1)));
    cutoff.format("%Y-%m-%d").to_string()
}

/// Summed fine across summaries, optionally restricted to a trailing
/// N-day window ending today.
pub(crate) fn total_fine_in_window(
    conn: &Connection,
    user_id: &str,
    days: Option<u32>,
) -> Result<f64, StoreError> {
    let total = match days {
        Some(days) => conn.query_row(
            "SELECT COALESCE(SUM(total_fine), 0) FROM daily_summaries
             WHERE user_id = ?1 AND date >= ?2",
            params![user_id, window_start(days)],
            |row| row.get(0),
        )?,
        None => conn.query_row(
            "SELECT COALESCE(SUM(total_fine), 0) FROM daily_summaries WHERE user_id = ?1",
            params![user_id],
            |row| row.get(0),
        )?,
    };
    Ok(total)
}

/// The word id appearing most often as a day's most-common word,
/// optionally restricted to a trailing N-day window. Ties resolve to the
/// most recent day (deterministic for a fixed summary set).
pub(crate) fn most_frequent_word(
    conn: &Connection,
    user_id: &str,
    days: Option<u32>,
) -> Result<Option<String>, StoreError> {
    let sql = "SELECT most_common_word_id FROM daily_summaries
               WHERE user_id = ?1 AND most_common_word_id IS NOT NULL AND date >= ?2
               GROUP BY most_common_word_id
               ORDER BY COUNT(*) DESC, MAX(date) DESC
               LIMIT 1";
    let start = days.map(window_start).unwrap_or_else(|| "0000-00-00".to_string());
    Ok(conn
        .prepare(sql)?
        .query_row(params![user_id, start], |row| row.get::<_, String>(0))
        .optional()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use uuid::Uuid;

    fn make_summary(user_id: &str, date: &str, count: u64, fine: f64) -> DailySummary {
        DailySummary {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: date.to_string(),
            swear_count: count,
            total_fine: fine,
            most_common_word_id: None,
            most_common_mood: None,
            is_clean_day: count == 0,
        }
    }

    #[test]
    fn upsert_keeps_single_row() {
        let db = Database::open_memory().unwrap();
        let first = make_summary("u1", "2024-03-01", 2, 0.50);
        upsert_summary(db.conn(), &first).unwrap();

        let mut second = make_summary("u1", "2024-03-01", 3, 0.75);
        second.id = Uuid::new_v4().to_string();
        upsert_summary(db.conn(), &second).unwrap();

        let rows: i64 = db
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM daily_summaries WHERE user_id = 'u1'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(rows, 1);

        // Update in place keeps the original id
        let fetched = get_summary(db.conn(), "u1", "2024-03-01").unwrap().unwrap();
        assert_eq!(fetched.id, first.id);
        assert_eq!(fetched.swear_count, 3);
    }

    #[test]
    fn range_query_is_lexicographic() {
        let db = Database::open_memory().unwrap();
        for (date, count) in [
            ("2024-02-28", 1),
            ("2024-03-01", 0),
            ("2024-03-02", 2),
            ("2024-04-01", 5),
        ] {
            upsert_summary(db.conn(), &make_summary("u1", date, count, 0.25)).unwrap();
        }

        let range = summaries_in_range(db.conn(), "u1", "2024-03-01", "2024-03-31").unwrap();
        assert_eq!(range.len(), 2);
        assert_eq!(range[0].date, "2024-03-01");
        assert_eq!(range[1].date, "2024-03-02");
    }

    #[test]
    fn clean_days_counted() {
        let db = Database::open_memory().unwrap();
        upsert_summary(db.conn(), &make_summary("u1", "2024-03-01", 0, 0.0)).unwrap();
        upsert_summary(db.conn(), &make_summary("u1", "2024-03-02", 4, 1.0)).unwrap();
        upsert_summary(db.conn(), &make_summary("u1", "2024-03-03", 0, 0.0)).unwrap();
        assert_eq!(clean_day_count(db.conn(), "u1").unwrap(), 2);
    }

    #[test]
    fn most_frequent_word_across_summaries() {
        let db = Database::open_memory().unwrap();
        for (date, word) in [
            ("2024-03-01", Some("w1")),
            ("2024-03-02", Some("w2")),
            ("2024-03-03", Some("w1")),
            ("2024-03-04", None),
        ] {
            let mut s = make_summary("u1", date, 1, 0.25);
            s.most_common_word_id = word.map(str::to_string);
            upsert_summary(db.conn(), &s).unwrap();
        }
        let top = most_frequent_word(db.conn(), "u1", None).unwrap();
        assert_eq!(top.as_deref(), Some("w1"));
        assert_eq!(most_frequent_word(db.conn(), "u2", None).unwrap(), None);
    }
}
