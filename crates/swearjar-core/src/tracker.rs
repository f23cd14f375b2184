//! External interface of the core: profile management, the transactional
//! log recorder, dashboard/stats queries, and dictionary management.
//!
//! Everything multi-step runs inside one SQLite transaction on the shared
//! connection: either all writes commit or none do. A failed
//! `record_event` leaves no orphaned log row and no half-credited totals.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::StoreError;
use crate::fine;
use crate::model::{
    local_day, today, DailySummary, Mood, Severity, StreakHistory, SwearLog, SwearWord, User,
    UserSettings, UserWord,
};
use crate::storage::{logs, summaries, users, words, Database};
use crate::streak::{self, StreakEngine};
use crate::summary;

/// Optional tags attached to a logged event.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    pub mood: Option<Mood>,
    pub context: Option<String>,
    pub location: Option<String>,
}

/// Everything the main screen needs in one read.
#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardSnapshot {
    pub user: User,
    pub current_streak: Option<StreakHistory>,
    pub today: DailySummary,
    pub recent_logs: Vec<SwearLog>,
}

/// Facade over the entity store.
///
/// Constructed from an explicitly provided [`Database`] handle so tests
/// can run against an in-memory store.
pub struct Tracker {
    db: Database,
}

impl Tracker {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the on-disk database and install the starter dictionary.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let db = Database::open()?;
        words::seed_default_words(db.conn())?;
        Ok(Self { db })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Streak engine over the same database handle.
    pub fn streaks(&self) -> StreakEngine<'_> {
        StreakEngine::new(&self.db)
    }

    // === profiles ===

    /// Create a user profile with default settings.
    pub fn create_user(
        &self,
        username: &str,
        display_name: Option<&str>,
    ) -> Result<User, StoreError> {
        if username.trim().is_empty() {
            return Err(StoreError::ConstraintViolation(
                "username must not be empty".to_string(),
            ));
        }
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            display_name: display_name.map(str::to_string),
            created_at: now,
            last_active: now,
            streak_days: 0,
            total_swears: 0,
            total_fine: 0.0,
        };

        let tx = self.db.begin()?;
        users::insert_user(&tx, &user)?;
        users::insert_settings(&tx, &UserSettings::defaults_for(&user.id))?;
        tx.commit().map_err(StoreError::from)?;
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> Result<User, StoreError> {
        users::require_user(self.db.conn(), user_id)
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        users::get_user_by_username(self.db.conn(), username)
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        users::list_users(self.db.conn())
    }

    /// Zero the cached totals. Logs and streak history stay untouched;
    /// the cached totals are authoritative after a reset.
    pub fn reset_statistics(&self, user_id: &str) -> Result<(), StoreError> {
        users::reset_totals(self.db.conn(), user_id)
    }

    /// Delete a user and everything they own.
    pub fn delete_user(&self, user_id: &str) -> Result<(), StoreError> {
        let tx = self.db.begin()?;
        users::delete_user_cascade(&tx, user_id)?;
        streak::clear_guard_tx(&tx, user_id)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    // === settings ===

    pub fn settings(&self, user_id: &str) -> Result<UserSettings, StoreError> {
        users::get_settings(self.db.conn(), user_id)?
            .ok_or_else(|| StoreError::not_found("user_settings", user_id))
    }

    pub fn update_settings(&self, settings: &UserSettings) -> Result<(), StoreError> {
        users::update_settings(self.db.conn(), settings)
    }

    // === dictionary ===

    /// Add a word to the dictionary. The fine defaults from severity
    /// when not given.
    pub fn add_word(
        &self,
        text: &str,
        severity: Severity,
        fine: Option<f64>,
    ) -> Result<SwearWord, StoreError> {
        if text.trim().is_empty() {
            return Err(StoreError::ConstraintViolation(
                "word must not be empty".to_string(),
            ));
        }
        let default_fine = fine.unwrap_or_else(|| severity.default_fine());
        if default_fine <= 0.0 {
            return Err(StoreError::ConstraintViolation(
                "fine must be positive".to_string(),
            ));
        }
        let word = SwearWord {
            id: Uuid::new_v4().to_string(),
            word: text.to_string(),
            severity,
            default_fine,
            is_custom: true,
        };
        words::insert_word(self.db.conn(), &word)?;
        Ok(word)
    }

    pub fn get_word(&self, word_id: &str) -> Result<SwearWord, StoreError> {
        words::require_word(self.db.conn(), word_id)
    }

    pub fn get_word_by_text(&self, text: &str) -> Result<Option<SwearWord>, StoreError> {
        words::get_word_by_text(self.db.conn(), text)
    }

    pub fn list_words(&self) -> Result<Vec<SwearWord>, StoreError> {
        words::list_words(self.db.conn())
    }

    pub fn search_words(&self, text: &str) -> Result<Vec<SwearWord>, StoreError> {
        words::search_words(self.db.conn(), text)
    }

    pub fn update_word_severity(
        &self,
        word_id: &str,
        severity: Severity,
    ) -> Result<(), StoreError> {
        words::update_word_severity(self.db.conn(), word_id, severity)
    }

    /// Remove a word. User overrides and log rows for the word are
    /// deleted and the owners' cached totals debited; summaries keep a
    /// soft reference, so their word id is nulled instead. Affected
    /// summaries are regenerated lazily on the next recompute.
    pub fn remove_word(&self, word_id: &str) -> Result<(), StoreError> {
        let tx = self.db.begin()?;
        words::delete_word_cascade(&tx, word_id)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// Set or clear the per-user fine override for a word. Creates the
    /// override row on first use, seeded from the word's default fine.
    pub fn set_custom_fine(
        &self,
        user_id: &str,
        word_id: &str,
        fine: Option<f64>,
    ) -> Result<UserWord, StoreError> {
        if let Some(f) = fine {
            if f <= 0.0 {
                return Err(StoreError::ConstraintViolation(
                    "fine must be positive".to_string(),
                ));
            }
        }
        users::require_user(self.db.conn(), user_id)?;
        words::set_custom_fine(self.db.conn(), user_id, word_id, fine)
    }

    pub fn set_word_active(
        &self,
        user_id: &str,
        word_id: &str,
        active: bool,
    ) -> Result<UserWord, StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        words::set_word_active(self.db.conn(), user_id, word_id, active)
    }

    // === event recording ===

    /// Record an event that just happened.
    pub fn record_event(
        &self,
        user_id: &str,
        word_id: &str,
        opts: LogOptions,
    ) -> Result<SwearLog, StoreError> {
        self.record_event_at(user_id, word_id, opts, Utc::now())
    }

    /// Record an event at an explicit event time (replay/backfill).
    ///
    /// One transaction covers the log insert, the totals update, the
    /// streak break and the day's summary recompute; any failure rolls
    /// the whole unit back.
    pub fn record_event_at(
        &self,
        user_id: &str,
        word_id: &str,
        opts: LogOptions,
        timestamp: DateTime<Utc>,
    ) -> Result<SwearLog, StoreError> {
        let tx = self.db.begin()?;

        users::require_user(&tx, user_id)?;
        let fine_amount = fine::resolve_fine(&tx, user_id, word_id)?;

        let entry = SwearLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            word_id: word_id.to_string(),
            timestamp,
            local_date: local_day(timestamp),
            mood: opts.mood,
            worth_it: None,
            context: opts.context,
            fine_amount,
            location: opts.location,
        };
        logs::insert_log(&tx, &entry)?;
        users::bump_totals(&tx, user_id, fine_amount, timestamp)?;
        streak::break_tx(&tx, user_id, timestamp)?;
        summary::recompute_tx(&tx, user_id, &entry.local_date)?;

        tx.commit().map_err(StoreError::from)?;
        log::debug!(
            "[record_event] user {user_id} logged word {word_id} (fine {fine_amount:.2})"
        );
        Ok(entry)
    }

    /// Delete one log. The owner's totals are debited and the day's
    /// summary recomputed in the same transaction.
    pub fn delete_log(&self, log_id: &str) -> Result<(), StoreError> {
        let tx = self.db.begin()?;
        let entry = logs::get_log(&tx, log_id)?
            .ok_or_else(|| StoreError::not_found("log", log_id))?;
        logs::delete_log(&tx, log_id)?;
        users::debit_totals(&tx, &entry.user_id, entry.fine_amount)?;
        summary::recompute_tx(&tx, &entry.user_id, &entry.local_date)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(())
    }

    /// Set the after-the-fact worth-it verdict on a log.
    pub fn update_worth_it(&self, log_id: &str, worth_it: bool) -> Result<(), StoreError> {
        logs::update_worth_it(self.db.conn(), log_id, worth_it)
    }

    pub fn get_log(&self, log_id: &str) -> Result<SwearLog, StoreError> {
        logs::get_log(self.db.conn(), log_id)?
            .ok_or_else(|| StoreError::not_found("log", log_id))
    }

    pub fn recent_logs(&self, user_id: &str, limit: u32) -> Result<Vec<SwearLog>, StoreError> {
        logs::recent_logs(self.db.conn(), user_id, limit)
    }

    // === summaries & stats ===

    /// Recompute the summary for one (user, day). Idempotent; safe to
    /// call any number of times.
    pub fn recompute_day(&self, user_id: &str, date: &str) -> Result<DailySummary, StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        let tx = self.db.begin()?;
        let result = summary::recompute_tx(&tx, user_id, date)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(result)
    }

    /// Today's summary, computing it if absent.
    pub fn ensure_today(&self, user_id: &str) -> Result<DailySummary, StoreError> {
        users::require_user(self.db.conn(), user_id)?;
        let tx = self.db.begin()?;
        let result = summary::ensure_today_tx(&tx, user_id)?;
        tx.commit().map_err(StoreError::from)?;
        Ok(result)
    }

    /// Summaries for local days in [start, end] ("YYYY-MM-DD").
    pub fn stats_for_range(
        &self,
        user_id: &str,
        start: &str,
        end: &str,
    ) -> Result<Vec<DailySummary>, StoreError> {
        summaries::summaries_in_range(self.db.conn(), user_id, start, end)
    }

    pub fn clean_day_count(&self, user_id: &str) -> Result<u64, StoreError> {
        summaries::clean_day_count(self.db.conn(), user_id)
    }

    /// Summed fine across summaries, optionally over a trailing N-day
    /// window ending today.
    pub fn total_fine_in_window(
        &self,
        user_id: &str,
        days: Option<u32>,
    ) -> Result<f64, StoreError> {
        summaries::total_fine_in_window(self.db.conn(), user_id, days)
    }

    /// Most frequent word across summaries, optionally windowed.
    pub fn most_frequent_word(
        &self,
        user_id: &str,
        days: Option<u32>,
    ) -> Result<Option<SwearWord>, StoreError> {
        let word_id = summaries::most_frequent_word(self.db.conn(), user_id, days)?;
        match word_id {
            Some(id) => Ok(words::get_word(self.db.conn(), &id)?),
            None => Ok(None),
        }
    }

    /// One read for the main screen: totals, current streak, today's
    /// summary and the most recent logs.
    pub fn dashboard(
        &self,
        user_id: &str,
        recent_limit: u32,
    ) -> Result<DashboardSnapshot, StoreError> {
        let user = users::require_user(self.db.conn(), user_id)?;
        let current_streak = self.streaks().current(user_id)?;
        let today_summary = self.ensure_today(user_id)?;
        let recent = logs::recent_logs(self.db.conn(), user_id, recent_limit)?;
        Ok(DashboardSnapshot {
            user,
            current_streak,
            today: today_summary,
            recent_logs: recent,
        })
    }

    /// Convenience for scheduled invocation at app start: extend the
    /// streak for today if the day is clean, then return today's summary.
    pub fn daily_tick(&self, user_id: &str) -> Result<DailySummary, StoreError> {
        self.streaks().extend_on(user_id, &today())?;
        self.ensure_today(user_id)
    }
}
