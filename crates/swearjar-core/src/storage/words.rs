//! Dictionary (SwearWord) and per-user override (UserWord) queries.

use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::error::StoreError;
use crate::model::{Severity, SwearWord, UserWord};

fn row_to_word(row: &rusqlite::Row) -> Result<SwearWord, rusqlite::Error> {
    let severity_str: String = row.get("severity")?;
    Ok(SwearWord {
        id: row.get("id")?,
        word: row.get("word")?,
        severity: Severity::parse(&severity_str),
        default_fine: row.get("default_fine")?,
        is_custom: row.get("is_custom")?,
    })
}

fn row_to_user_word(row: &rusqlite::Row) -> Result<UserWord, rusqlite::Error> {
    Ok(UserWord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        word_id: row.get("word_id")?,
        custom_fine: row.get("custom_fine")?,
        is_active: row.get("is_active")?,
    })
}

pub(crate) fn insert_word(conn: &Connection, word: &SwearWord) -> Result<(), StoreError> {
    log::debug!("[insert_word] adding '{}' to dictionary", word.word);
    conn.execute(
        "INSERT INTO swear_words (id, word, severity, default_fine, is_custom)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            word.id,
            word.word,
            word.severity.as_str(),
            word.default_fine,
            word.is_custom,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_word(conn: &Connection, id: &str) -> Result<Option<SwearWord>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM swear_words WHERE id = ?1")?
        .query_row(params![id], row_to_word)
        .optional()?)
}

pub(crate) fn get_word_by_text(
    conn: &Connection,
    text: &str,
) -> Result<Option<SwearWord>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM swear_words WHERE word = ?1")?
        .query_row(params![text], row_to_word)
        .optional()?)
}

/// Fetch a word or fail with NotFound.
pub(crate) fn require_word(conn: &Connection, id: &str) -> Result<SwearWord, StoreError> {
    get_word(conn, id)?.ok_or_else(|| StoreError::not_found("word", id))
}

pub(crate) fn list_words(conn: &Connection) -> Result<Vec<SwearWord>, StoreError> {
    let mut stmt = conn.prepare("SELECT * FROM swear_words ORDER BY word")?;
    let words = stmt
        .query_map([], row_to_word)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(words)
}

pub(crate) fn search_words(conn: &Connection, text: &str) -> Result<Vec<SwearWord>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT * FROM swear_words WHERE word LIKE ?1 ESCAPE '\\' ORDER BY word")?;
    let pattern = format!("%{}%", text.replace('%', "\\%").replace('_', "\\_"));
    let words = stmt
        .query_map(params![pattern], row_to_word)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(words)
}

/// Change a word's severity. The default fine is re-derived from the new
/// severity; historical log fines are untouched.
pub(crate) fn update_word_severity(
    conn: &Connection,
    word_id: &str,
    severity: Severity,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE swear_words SET severity = ?2, default_fine = ?3 WHERE id = ?1",
        params![word_id, severity.as_str(), severity.default_fine()],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("word", word_id));
    }
    Ok(())
}

/// Delete a word, its per-user overrides and its log rows; summaries keep
/// a soft reference, so their word id is nulled instead. Owners of the
/// deleted log rows have their cached totals debited, matching single-log
/// deletion.
///
/// Caller wraps this in a transaction.
pub(crate) fn delete_word_cascade(conn: &Connection, word_id: &str) -> Result<(), StoreError> {
    conn.execute("DELETE FROM user_words WHERE word_id = ?1", params![word_id])?;
    conn.execute(
        "UPDATE users SET
             total_swears = MAX(total_swears - (SELECT COUNT(*) FROM swear_logs
                 WHERE word_id = ?1 AND user_id = users.id), 0),
             total_fine = MAX(total_fine - (SELECT COALESCE(SUM(fine_amount), 0) FROM swear_logs
                 WHERE word_id = ?1 AND user_id = users.id), 0)
         WHERE id IN (SELECT DISTINCT user_id FROM swear_logs WHERE word_id = ?1)",
        params![word_id],
    )?;
    conn.execute("DELETE FROM swear_logs WHERE word_id = ?1", params![word_id])?;
    conn.execute(
        "UPDATE daily_summaries SET most_common_word_id = NULL WHERE most_common_word_id = ?1",
        params![word_id],
    )?;
    let changed = conn.execute("DELETE FROM swear_words WHERE id = ?1", params![word_id])?;
    if changed == 0 {
        return Err(StoreError::not_found("word", word_id));
    }
    log::info!("[delete_word_cascade] word {word_id} deleted");
    Ok(())
}

// === user words ===

pub(crate) fn get_user_word(
    conn: &Connection,
    user_id: &str,
    word_id: &str,
) -> Result<Option<UserWord>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM user_words WHERE user_id = ?1 AND word_id = ?2")?
        .query_row(params![user_id, word_id], row_to_user_word)
        .optional()?)
}

/// Get the override row for (user, word), creating it if absent.
///
/// A fresh override is seeded with the word's current default fine.
pub(crate) fn get_or_create_user_word(
    conn: &Connection,
    user_id: &str,
    word_id: &str,
) -> Result<UserWord, StoreError> {
    if let Some(existing) = get_user_word(conn, user_id, word_id)? {
        return Ok(existing);
    }
    let word = require_word(conn, word_id)?;
    let user_word = UserWord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        word_id: word_id.to_string(),
        custom_fine: Some(word.default_fine),
        is_active: true,
    };
    conn.execute(
        "INSERT INTO user_words (id, user_id, word_id, custom_fine, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            user_word.id,
            user_word.user_id,
            user_word.word_id,
            user_word.custom_fine,
            user_word.is_active,
        ],
    )?;
    Ok(user_word)
}

/// Set or clear the custom fine on the (user, word) override.
/// None falls back to the word's default at resolution time.
pub(crate) fn set_custom_fine(
    conn: &Connection,
    user_id: &str,
    word_id: &str,
    fine: Option<f64>,
) -> Result<UserWord, StoreError> {
    let mut user_word = get_or_create_user_word(conn, user_id, word_id)?;
    conn.execute(
        "UPDATE user_words SET custom_fine = ?2 WHERE id = ?1",
        params![user_word.id, fine],
    )?;
    user_word.custom_fine = fine;
    Ok(user_word)
}

pub(crate) fn set_word_active(
    conn: &Connection,
    user_id: &str,
    word_id: &str,
    active: bool,
) -> Result<UserWord, StoreError> {
    let mut user_word = get_or_create_user_word(conn, user_id, word_id)?;
    conn.execute(
        "UPDATE user_words SET is_active = ?2 WHERE id = ?1",
        params![user_word.id, active],
    )?;
    user_word.is_active = active;
    Ok(user_word)
}

/// Starter dictionary installed on first run.
const DEFAULT_WORDS: &[(&str, Severity)] = &[
    ("damn", Severity::Mild),
    ("hell", Severity::Mild),
    ("crap", Severity::Mild),
    ("bloody", Severity::Mild),
    ("ass", Severity::Moderate),
    ("bastard", Severity::Moderate),
    ("bitch", Severity::Moderate),
    ("shit", Severity::Moderate),
    ("fuck", Severity::Severe),
    ("motherfucker", Severity::Severe),
];

/// Install the starter word list if missing. Safe to call repeatedly;
/// words the user already has (or has deleted and re-added) are skipped.
pub(crate) fn seed_default_words(conn: &Connection) -> Result<usize, StoreError> {
    let mut inserted = 0;
    for (text, severity) in DEFAULT_WORDS {
        if get_word_by_text(conn, text)?.is_some() {
            continue;
        }
        insert_word(
            conn,
            &SwearWord {
                id: Uuid::new_v4().to_string(),
                word: (*text).to_string(),
                severity: *severity,
                default_fine: severity.default_fine(),
                is_custom: false,
            },
        )?;
        inserted += 1;
    }
    if inserted > 0 {
        log::info!("[seed_default_words] installed {inserted} starter words");
    }
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;

    fn make_word(text: &str, severity: Severity) -> SwearWord {
        SwearWord {
            id: Uuid::new_v4().to_string(),
            word: text.to_string(),
            severity,
            default_fine: severity.default_fine(),
            is_custom: true,
        }
    }

    #[test]
    fn insert_and_lookup() {
        let db = Database::open_memory().unwrap();
        let word = make_word("damn", Severity::Mild);
        insert_word(db.conn(), &word).unwrap();

        let by_id = get_word(db.conn(), &word.id).unwrap().unwrap();
        assert_eq!(by_id.word, "damn");
        assert_eq!(by_id.default_fine, 0.25);

        let by_text = get_word_by_text(db.conn(), "damn").unwrap().unwrap();
        assert_eq!(by_text.id, word.id);
    }

    #[test]
    fn duplicate_word_rejected() {
        let db = Database::open_memory().unwrap();
        insert_word(db.conn(), &make_word("hell", Severity::Mild)).unwrap();
        let err = insert_word(db.conn(), &make_word("hell", Severity::Severe)).unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[test]
    fn search_is_substring_match() {
        let db = Database::open_memory().unwrap();
        insert_word(db.conn(), &make_word("damn", Severity::Mild)).unwrap();
        insert_word(db.conn(), &make_word("goddamn", Severity::Moderate)).unwrap();
        insert_word(db.conn(), &make_word("hell", Severity::Mild)).unwrap();

        let hits = search_words(db.conn(), "damn").unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|w| w.word.contains("damn")));
    }

    #[test]
    fn severity_update_rederives_default_fine() {
        let db = Database::open_memory().unwrap();
        let word = make_word("crap", Severity::Mild);
        insert_word(db.conn(), &word).unwrap();

        update_word_severity(db.conn(), &word.id, Severity::Severe).unwrap();
        let fetched = get_word(db.conn(), &word.id).unwrap().unwrap();
        assert_eq!(fetched.severity, Severity::Severe);
        assert_eq!(fetched.default_fine, 1.00);
    }

    #[test]
    fn override_seeded_from_current_default() {
        let db = Database::open_memory().unwrap();
        let word = make_word("bloody", Severity::Moderate);
        insert_word(db.conn(), &word).unwrap();

        let user_word = get_or_create_user_word(db.conn(), "u1", &word.id).unwrap();
        assert_eq!(user_word.custom_fine, Some(0.50));
        assert!(user_word.is_active);

        // Second call returns the same row
        let again = get_or_create_user_word(db.conn(), "u1", &word.id).unwrap();
        assert_eq!(again.id, user_word.id);
    }

    #[test]
    fn override_for_missing_word_fails() {
        let db = Database::open_memory().unwrap();
        let err = get_or_create_user_word(db.conn(), "u1", "missing").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn seed_is_idempotent() {
        let db = Database::open_memory().unwrap();
        let first = seed_default_words(db.conn()).unwrap();
        assert!(first > 0);
        let second = seed_default_words(db.conn()).unwrap();
        assert_eq!(second, 0);
    }
}
