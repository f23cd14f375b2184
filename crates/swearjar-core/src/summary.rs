//! Daily summary aggregation.
//!
//! One pure function turns a day's log set into summary facts; the
//! transactional wrapper upserts the row. Recomputation is idempotent:
//! for a fixed log set it yields the same facts every time, and the
//! unique (user_id, date) constraint keeps it to one row.

use rusqlite::Connection;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{today, DailySummary, Mood, SwearLog};
use crate::storage::{logs, summaries};

/// Aggregate facts for one (user, day) log set.
#[derive(Debug, Clone, PartialEq)]
pub struct DayFacts {
    pub swear_count: u64,
    pub total_fine: f64,
    pub most_common_word_id: Option<String>,
    pub most_common_mood: Option<Mood>,
    pub is_clean_day: bool,
}

/// Most frequent key in iteration order; first encountered wins ties.
/// Linear scan is fine at day scale.
fn mode_of<K: PartialEq>(keys: impl Iterator<Item = K>) -> Option<K> {
    let mut counts: Vec<(K, u64)> = Vec::new();
    for key in keys {
        match counts.iter_mut().find(|(k, _)| *k == key) {
            Some((_, n)) => *n += 1,
            None => counts.push((key, 1)),
        }
    }
    counts
        .into_iter()
        .fold(None, |best: Option<(K, u64)>, (k, n)| match best {
            // Strictly greater only, so the earliest key keeps a tie.
            Some((_, m)) if n > m => Some((k, n)),
            None => Some((k, n)),
            some => some,
        })
        .map(|(k, _)| k)
}

/// Pure aggregation over one day's logs.
///
/// Callers pass logs in timestamp order, which makes the tie-break for
/// most-common word/mood (first encountered) deterministic.
pub fn aggregate_day(day_logs: &[SwearLog]) -> DayFacts {
    let swear_count = day_logs.len() as u64;
    let total_fine = day_logs.iter().map(|l| l.fine_amount).sum();
    let most_common_word_id = mode_of(day_logs.iter().map(|l| l.word_id.clone()));
    let most_common_mood = mode_of(day_logs.iter().filter_map(|l| l.mood));

    DayFacts {
        swear_count,
        total_fine,
        most_common_word_id,
        most_common_mood,
        is_clean_day: swear_count == 0,
    }
}

/// Recompute and upsert the summary for (user, date) inside the caller's
/// transaction.
pub(crate) fn recompute_tx(
    conn: &Connection,
    user_id: &str,
    date: &str,
) -> Result<DailySummary, StoreError> {
    let day_logs = logs::logs_for_day(conn, user_id, date)?;
    let facts = aggregate_day(&day_logs);

    // Keep an existing row's id stable across recomputes.
    let id = summaries::get_summary(conn, user_id, date)?
        .map(|s| s.id)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let summary = DailySummary {
        id,
        user_id: user_id.to_string(),
        date: date.to_string(),
        swear_count: facts.swear_count,
        total_fine: facts.total_fine,
        most_common_word_id: facts.most_common_word_id,
        most_common_mood: facts.most_common_mood,
        is_clean_day: facts.is_clean_day,
    };
    summaries::upsert_summary(conn, &summary)?;
    Ok(summary)
}

/// Today's summary, computing it if absent.
pub(crate) fn ensure_today_tx(conn: &Connection, user_id: &str) -> Result<DailySummary, StoreError> {
    let date = today();
    match summaries::get_summary(conn, user_id, &date)? {
        Some(existing) => Ok(existing),
        None => recompute_tx(conn, user_id, &date),
    }
}
