//! Core error types for swearjar-core.
//!
//! This module defines the error hierarchy using thiserror. Every entity
//! store operation reports failure explicitly through these types; there
//! are no silent defaults.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for swearjar-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Entity store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Entity store errors.
///
/// A failed multi-step write (event recording, streak transition,
/// summary upsert) rolls back its whole transaction, so any of these
/// errors means no partial state was left behind.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A referenced user/word/log does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Username uniqueness violation on profile creation
    #[error("Username already taken: {0}")]
    UsernameTaken(String),

    /// A write violated a uniqueness or foreign-key invariant
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Underlying I/O or transaction failure
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => {
                if e.code == rusqlite::ErrorCode::ConstraintViolation {
                    StoreError::ConstraintViolation(
                        msg.clone().unwrap_or_else(|| e.to_string()),
                    )
                } else {
                    StoreError::StorageFailure(err.to_string())
                }
            }
            _ => StoreError::StorageFailure(err.to_string()),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
