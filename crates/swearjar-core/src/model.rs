//! Entity types shared across the storage and aggregation layers.
//!
//! Timestamps are RFC 3339 UTC instants. Calendar days are local-timezone
//! `YYYY-MM-DD` strings; streak and clean-day logic keys off those strings
//! rather than raw instant comparison so it stays correct across DST
//! transitions.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};

/// Severity class of a dictionary word. Determines the default fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Default fine for a word of this severity.
    pub fn default_fine(&self) -> f64 {
        match self {
            Severity::Mild => 0.25,
            Severity::Moderate => 0.50,
            Severity::Severe => 1.00,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    /// Parse from database string, falling back to mild.
    pub fn parse(s: &str) -> Severity {
        match s {
            "moderate" => Severity::Moderate,
            "severe" => Severity::Severe,
            _ => Severity::Mild,
        }
    }
}

/// Mood attached to a logged event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    Angry,
    Frustrated,
    Surprised,
    Amused,
    Stressed,
    Other,
}

impl Mood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Angry => "angry",
            Mood::Frustrated => "frustrated",
            Mood::Surprised => "surprised",
            Mood::Amused => "amused",
            Mood::Stressed => "stressed",
            Mood::Other => "other",
        }
    }

    /// Parse from database string, falling back to other.
    pub fn parse(s: &str) -> Mood {
        match s {
            "angry" => Mood::Angry,
            "frustrated" => Mood::Frustrated,
            "surprised" => Mood::Surprised,
            "amused" => Mood::Amused,
            "stressed" => Mood::Stressed,
            _ => Mood::Other,
        }
    }
}

/// A user profile with denormalized running totals.
///
/// `streak_days` is a cache of the current streak length; the streak
/// engine is the authoritative source. `total_swears`/`total_fine`
/// track all recorded events and are updated in the same transaction
/// that inserts the log row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
    pub streak_days: u32,
    pub total_swears: u64,
    pub total_fine: f64,
}

/// A dictionary entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwearWord {
    pub id: String,
    pub word: String,
    pub severity: Severity,
    pub default_fine: f64,
    pub is_custom: bool,
}

/// Per-user override of a dictionary word.
///
/// Created lazily the first time a user customizes a word; the custom
/// fine is seeded from the word's default fine at creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserWord {
    pub id: String,
    pub user_id: String,
    pub word_id: String,
    pub custom_fine: Option<f64>,
    pub is_active: bool,
}

/// One logged swear event.
///
/// `fine_amount` is captured at log time and never re-derived; later
/// fine edits do not retroactively alter history. `local_date` is the
/// local-calendar day string of `timestamp`, captured at log time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwearLog {
    pub id: String,
    pub user_id: String,
    pub word_id: String,
    pub timestamp: DateTime<Utc>,
    pub local_date: String,
    pub mood: Option<Mood>,
    pub worth_it: Option<bool>,
    pub context: Option<String>,
    pub fine_amount: f64,
    pub location: Option<String>,
}

/// One-to-one settings row for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSettings {
    pub user_id: String,
    pub notifications_enabled: bool,
    pub dark_mode: bool,
    pub reminder_time: Option<String>,
    pub share_stats: bool,
    pub auto_location: bool,
}

impl UserSettings {
    pub fn defaults_for(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            notifications_enabled: true,
            dark_mode: false,
            reminder_time: None,
            share_stats: false,
            auto_location: false,
        }
    }
}

/// One distinct streak interval for a user.
///
/// At most one row per user has `is_current = true`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreakHistory {
    pub id: String,
    pub user_id: String,
    pub streak_length: u32,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    pub is_current: bool,
}

/// Per-user, per-calendar-day aggregate, derived entirely from that
/// day's log rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: String,
    pub user_id: String,
    pub date: String,
    pub swear_count: u64,
    pub total_fine: f64,
    pub most_common_word_id: Option<String>,
    pub most_common_mood: Option<Mood>,
    pub is_clean_day: bool,
}

/// Local-calendar day string for an instant.
///
/// Two timestamps belong to the same day iff these strings match.
pub fn local_day(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%Y-%m-%d").to_string()
}

/// Today's local-calendar day string.
pub fn today() -> String {
    local_day(Utc::now())
}
