//! # SwearJar Core Library
//!
//! Core business logic for the SwearJar habit tracker: users log
//! instances of profanity use, tag them with mood/context, pay a fine
//! per word, and watch their clean-day streaks and daily summaries.
//! The CLI binary (and any GUI shell) is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Entity store**: SQLite-backed storage for users, the word
//!   dictionary, per-user overrides, logs, settings, streak history and
//!   daily summaries
//! - **Log recorder**: transactional event recording that keeps running
//!   totals, streaks and daily summaries consistent as a unit
//! - **Streak engine**: clean-streak state machine keyed on local
//!   calendar days
//! - **Daily summary aggregator**: one pure aggregation function plus an
//!   idempotent recompute-and-upsert
//!
//! ## Key Components
//!
//! - [`Tracker`]: facade over the entity store
//! - [`StreakEngine`]: streak state machine
//! - [`Database`]: SQLite handle and kv store
//! - [`Config`]: application configuration management

pub mod error;
pub mod model;
pub mod storage;
pub mod streak;
pub mod summary;
pub mod tracker;

mod fine;

pub use error::{ConfigError, CoreError, StoreError};
pub use model::{
    DailySummary, Mood, Severity, StreakHistory, SwearLog, SwearWord, User, UserSettings, UserWord,
};
pub use storage::{Config, Database};
pub use streak::StreakEngine;
pub use summary::{aggregate_day, DayFacts};
pub use tracker::{DashboardSnapshot, LogOptions, Tracker};
