//! Clean-streak state machine.
//!
//! A user is either between streaks or has exactly one current
//! StreakHistory row. Streak accounting operates on local calendar days,
//! never rolling 24-hour windows, so DST transitions cannot split or
//! merge days.
//!
//! The daily tick (`extend`) is idempotent: the last day a user's streak
//! was extended is remembered in the kv store, and a day with logged
//! events is never counted as clean.

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{today, StreakHistory};
use crate::storage::{database, logs, streaks, users, Database};

fn guard_key(user_id: &str) -> String {
    format!("streak_extended:{user_id}")
}

/// Start a streak if none is active. No-op when a current row exists.
pub(crate) fn ensure_started_tx(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
    day: &str,
) -> Result<StreakHistory, StoreError> {
    if let Some(current) = streaks::current_streak(conn, user_id)? {
        return Ok(current);
    }
    let streak = StreakHistory {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        streak_length: 1,
        start_date: now,
        end_date: None,
        is_current: true,
    };
    streaks::insert_streak(conn, &streak)?;
    users::set_streak_days(conn, user_id, 1)?;
    database::kv_set(conn, &guard_key(user_id), day)?;
    log::info!("[streak] started for user {user_id} on {day}");
    Ok(streak)
}

/// Credit one clean calendar day.
///
/// Returns the current streak row, or None when the day had logged
/// events. Calling twice on the same day is a no-op on the second call.
pub(crate) fn extend_tx(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
    day: &str,
) -> Result<Option<StreakHistory>, StoreError> {
    if database::kv_get(conn, &guard_key(user_id))?.as_deref() == Some(day) {
        return streaks::current_streak(conn, user_id);
    }
    if logs::has_logs_on_day(conn, user_id, day)? {
        // Not a clean day; nothing to credit.
        return Ok(None);
    }

    match streaks::current_streak(conn, user_id)? {
        Some(current) => {
            streaks::increment_streak(conn, &current.id)?;
            let length = current.streak_length + 1;
            users::set_streak_days(conn, user_id, length)?;
            database::kv_set(conn, &guard_key(user_id), day)?;
            log::debug!("[streak] user {user_id} extended to {length} on {day}");
            Ok(Some(StreakHistory {
                streak_length: length,
                ..current
            }))
        }
        None => ensure_started_tx(conn, user_id, now, day).map(Some),
    }
}

/// Close the current streak because an event was logged.
///
/// The row's length is frozen at its last value. Breaking when no streak
/// is active is a no-op, so multiple events on one day break at most
/// once.
pub(crate) fn break_tx(
    conn: &Connection,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    if let Some(current) = streaks::current_streak(conn, user_id)? {
        streaks::close_streak(conn, &current.id, now)?;
        users::set_streak_days(conn, user_id, 0)?;
        log::info!(
            "[streak] user {user_id} broke a {}-day streak",
            current.streak_length
        );
    }
    Ok(())
}

pub(crate) fn clear_guard_tx(conn: &Connection, user_id: &str) -> Result<(), StoreError> {
    database::kv_delete(conn, &guard_key(user_id))
}

/// Streak engine over an explicitly provided database handle.
pub struct StreakEngine<'a> {
    db: &'a Database,
}

impl<'a> StreakEngine<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Start a streak for the user if none is active.
    pub fn ensure_started(&self, user_id: &str) -> Result<StreakHistory, StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        let tx = self.db.begin()?;
        let streak = ensure_started_tx(&tx, user_id, Utc::now(), &today())?;
        tx.commit().map_err(StoreError::from)?;
        Ok(streak)
    }

    /// Daily tick: credit today as a clean day if it is one.
    pub fn extend(&self, user_id: &str) -> Result<Option<StreakHistory>, StoreError> {
        self.extend_on(user_id, &today())
    }

    /// Date-parameterised tick for deterministic replay/backfill.
    pub fn extend_on(&self, user_id: &str, day: &str) -> Result<Option<StreakHistory>, StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        let tx = self.db.begin()?;
        let streak = extend_tx(&tx, user_id, Utc::now(), day)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(streak)
    }

    /// Close the user's current streak, if any.
    pub fn break_streak(&self, user_id: &str) -> Result<(), StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        let tx = self.db.begin()?;
        break_tx(&tx, user_id, Utc::now())?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// The active streak row, if any.
    pub fn current(&self, user_id: &str) -> Result<Option<StreakHistory>, StoreError> {
        streaks::current_streak(self.db.conn(), user_id)
    }

    /// Longest streak across all rows, current or historical.
    pub fn longest(&self, user_id: &str) -> Result<u32, StoreError> {
        streaks::longest_streak(self.db.conn(), user_id)
    }

    /// All streak intervals, newest first.
    pub fn history(&self, user_id: &str) -> Result<Vec<StreakHistory>, StoreError> {
        streaks::list_streaks(self.db.conn(), user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{local_day, SwearLog, User};

    fn seed_user(db: &Database, username: &str) -> String {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            display_name: None,
            created_at: now,
            last_active: now,
            streak_days: 0,
            total_swears: 0,
            total_fine: 0.0,
        };
        users::insert_user(db.conn(), &user).unwrap();
        user.id
    }

    fn seed_log_on(db: &Database, user_id: &str, day: &str) {
        let now = Utc::now();
        logs::insert_log(
            db.conn(),
            &SwearLog {
                id: Uuid::new_v4().to_string(),
                user_id: user_id.to_string(),
                word_id: "w1".to_string(),
                timestamp: now,
                local_date: day.to_string(),
                mood: None,
                worth_it: None,
                context: None,
                fine_amount: 0.25,
                location: None,
            },
        )
        .unwrap();
    }

    #[test]
    fn three_clean_days_make_a_three_day_streak() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "alice");
        let engine = StreakEngine::new(&db);

        engine.extend_on(&user_id, "2024-03-01").unwrap();
        engine.extend_on(&user_id, "2024-03-02").unwrap();
        let streak = engine.extend_on(&user_id, "2024-03-03").unwrap().unwrap();
        assert_eq!(streak.streak_length, 3);
        assert!(streak.is_current);

        // Second tick on the same day must not double-increment
        let again = engine.extend_on(&user_id, "2024-03-03").unwrap().unwrap();
        assert_eq!(again.streak_length, 3);

        let user = users::get_user(db.conn(), &user_id).unwrap().unwrap();
        assert_eq!(user.streak_days, 3);
    }

    #[test]
    fn extend_skips_days_with_logged_events() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "bob");
        seed_log_on(&db, &user_id, "2024-03-01");

        let engine = StreakEngine::new(&db);
        assert!(engine.extend_on(&user_id, "2024-03-01").unwrap().is_none());
        assert!(engine.current(&user_id).unwrap().is_none());
    }

    #[test]
    fn breaking_freezes_length_and_closes_row() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "carol");
        let engine = StreakEngine::new(&db);

        engine.extend_on(&user_id, "2024-03-01").unwrap();
        engine.extend_on(&user_id, "2024-03-02").unwrap();

        engine.break_streak(&user_id).unwrap();
        assert!(engine.current(&user_id).unwrap().is_none());

        let rows = engine.history(&user_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].streak_length, 2);
        assert!(rows[0].end_date.is_some());
        assert!(!rows[0].is_current);

        let user = users::get_user(db.conn(), &user_id).unwrap().unwrap();
        assert_eq!(user.streak_days, 0);

        // Breaking again is a no-op, not an error
        engine.break_streak(&user_id).unwrap();
        assert_eq!(engine.history(&user_id).unwrap().len(), 1);
    }

    #[test]
    fn new_streak_starts_after_a_break() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "dave");
        let engine = StreakEngine::new(&db);

        engine.extend_on(&user_id, "2024-03-01").unwrap();
        engine.break_streak(&user_id).unwrap();

        let streak = engine.extend_on(&user_id, "2024-03-02").unwrap().unwrap();
        assert_eq!(streak.streak_length, 1);

        // Two intervals recorded, only one current
        let rows = engine.history(&user_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.iter().filter(|s| s.is_current).count(), 1);
        assert_eq!(engine.longest(&user_id).unwrap(), 1);
    }

    #[test]
    fn ensure_started_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "erin");
        let engine = StreakEngine::new(&db);

        let first = engine.ensure_started(&user_id).unwrap();
        let second = engine.ensure_started(&user_id).unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(second.streak_length, 1);
    }

    #[test]
    fn unknown_user_rejected() {
        let db = Database::open_memory().unwrap();
        let engine = StreakEngine::new(&db);
        let err = engine.extend_on("missing", "2024-03-01").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn longest_spans_closed_intervals() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "frank");
        let engine = StreakEngine::new(&db);

        for day in ["2024-03-01", "2024-03-02", "2024-03-03", "2024-03-04"] {
            engine.extend_on(&user_id, day).unwrap();
        }
        engine.break_streak(&user_id).unwrap();
        engine.extend_on(&user_id, "2024-03-06").unwrap();

        assert_eq!(engine.longest(&user_id).unwrap(), 4);
        assert_eq!(
            engine.current(&user_id).unwrap().unwrap().streak_length,
            1
        );
    }

    #[test]
    fn guard_survives_in_kv() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "gina");
        let engine = StreakEngine::new(&db);
        engine.extend_on(&user_id, "2024-03-01").unwrap();

        assert_eq!(
            db.kv_get(&guard_key(&user_id)).unwrap().as_deref(),
            Some("2024-03-01")
        );
        clear_guard_tx(db.conn(), &user_id).unwrap();
        assert!(db.kv_get(&guard_key(&user_id)).unwrap().is_none());
    }

    #[test]
    fn extend_today_uses_local_calendar_day() {
        let db = Database::open_memory().unwrap();
        let user_id = seed_user(&db, "hank");
        let engine = StreakEngine::new(&db);

        let streak = engine.extend(&user_id).unwrap().unwrap();
        assert_eq!(streak.streak_length, 1);
        assert_eq!(
            db.kv_get(&guard_key(&user_id)).unwrap().as_deref(),
            Some(local_day(Utc::now()).as_str())
        );
    }
}
