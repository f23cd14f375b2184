//! Fine resolution for (user, word) pairs.
//!
//! The resolved value is captured on the log row at log time and never
//! re-derived, so later edits to word or override fines leave history
//! untouched.

use rusqlite::Connection;

use crate::error::StoreError;
use crate::storage::words;

/// Resolve the applicable fine for (user, word).
///
/// An active per-user override with a custom fine wins; otherwise the
/// word's default fine applies. Inactive overrides are skipped. Fails
/// with NotFound if the word does not exist.
pub(crate) fn resolve_fine(
    conn: &Connection,
    user_id: &str,
    word_id: &str,
) -> Result<f64, StoreError> {
    let word = words::require_word(conn, word_id)?;

    if let Some(user_word) = words::get_user_word(conn, user_id, word_id)? {
        if user_word.is_active {
            if let Some(custom) = user_word.custom_fine {
                return Ok(custom);
            }
        }
    }

    Ok(word.default_fine)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Severity, SwearWord};
    use crate::storage::{words, Database};
    use uuid::Uuid;

    fn add_word(db: &Database, text: &str, severity: Severity) -> SwearWord {
        let word = SwearWord {
            id: Uuid::new_v4().to_string(),
            word: text.to_string(),
            severity,
            default_fine: severity.default_fine(),
            is_custom: false,
        };
        words::insert_word(db.conn(), &word).unwrap();
        word
    }

    #[test]
    fn default_fine_without_override() {
        let db = Database::open_memory().unwrap();
        let word = add_word(&db, "damn", Severity::Mild);
        let fine = resolve_fine(db.conn(), "u1", &word.id).unwrap();
        assert_eq!(fine, 0.25);
    }

    #[test]
    fn custom_fine_wins() {
        let db = Database::open_memory().unwrap();
        let word = add_word(&db, "hell", Severity::Mild);
        words::set_custom_fine(db.conn(), "u1", &word.id, Some(0.75)).unwrap();

        assert_eq!(resolve_fine(db.conn(), "u1", &word.id).unwrap(), 0.75);
        // Other users are unaffected
        assert_eq!(resolve_fine(db.conn(), "u2", &word.id).unwrap(), 0.25);
    }

    #[test]
    fn null_custom_fine_falls_back() {
        let db = Database::open_memory().unwrap();
        let word = add_word(&db, "crap", Severity::Moderate);
        words::set_custom_fine(db.conn(), "u1", &word.id, None).unwrap();
        assert_eq!(resolve_fine(db.conn(), "u1", &word.id).unwrap(), 0.50);
    }

    #[test]
    fn inactive_override_falls_back() {
        let db = Database::open_memory().unwrap();
        let word = add_word(&db, "bloody", Severity::Mild);
        words::set_custom_fine(db.conn(), "u1", &word.id, Some(2.0)).unwrap();
        words::set_word_active(db.conn(), "u1", &word.id, false).unwrap();
        assert_eq!(resolve_fine(db.conn(), "u1", &word.id).unwrap(), 0.25);
    }

    #[test]
    fn missing_word_is_not_found() {
        let db = Database::open_memory().unwrap();
        let err = resolve_fine(db.conn(), "u1", "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "word", .. }));
    }
}
