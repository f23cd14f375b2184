//! User and user-settings queries.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::StoreError;
use crate::model::{User, UserSettings};

fn row_to_user(row: &rusqlite::Row) -> Result<User, rusqlite::Error> {
    Ok(User {
        id: row.get("id")?,
        username: row.get("username")?,
        display_name: row.get("display_name")?,
        created_at: parse_datetime(&row.get::<_, String>("created_at")?)?,
        last_active: parse_datetime(&row.get::<_, String>("last_active")?)?,
        streak_days: row.get("streak_days")?,
        total_swears: row.get("total_swears")?,
        total_fine: row.get("total_fine")?,
    })
}

/// Parse an RFC 3339 string from a row. Corrupt data surfaces as a
/// conversion error rather than a made-up timestamp.
pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
        })
}

pub(crate) fn insert_user(conn: &Connection, user: &User) -> Result<(), StoreError> {
    log::debug!("[insert_user] inserting user {}", user.username);
    let result = conn.execute(
        "INSERT INTO users (id, username, display_name, created_at, last_active,
                            streak_days, total_swears, total_fine)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            user.id,
            user.username,
            user.display_name,
            user.created_at.to_rfc3339(),
            user.last_active.to_rfc3339(),
            user.streak_days,
            user.total_swears,
            user.total_fine,
        ],
    );
    match result {
        Ok(_) => Ok(()),
        Err(e) => match StoreError::from(e) {
            StoreError::ConstraintViolation(_) => {
                Err(StoreError::UsernameTaken(user.username.clone()))
            }
            other => Err(other),
        },
    }
}

pub(crate) fn get_user(conn: &Connection, id: &str) -> Result<Option<User>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM users WHERE id = ?1")?
        .query_row(params![id], row_to_user)
        .optional()?)
}

pub(crate) fn get_user_by_username(
    conn: &Connection,
    username: &str,
) -> Result<Option<User>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM users WHERE username = ?1")?
        .query_row(params![username], row_to_user)
        .optional()?)
}

pub(crate) fn list_users(conn: &Connection) -> Result<Vec<User>, StoreError> {
    let mut stmt = conn.prepare("SELECT * FROM users ORDER BY username")?;
    let users = stmt
        .query_map([], row_to_user)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(users)
}

/// Fetch a user or fail with NotFound.
pub(crate) fn require_user(conn: &Connection, id: &str) -> Result<User, StoreError> {
    get_user(conn, id)?.ok_or_else(|| StoreError::not_found("user", id))
}

/// Credit one logged event against the user's running totals.
pub(crate) fn bump_totals(
    conn: &Connection,
    user_id: &str,
    fine_amount: f64,
    now: DateTime<Utc>,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE users
         SET total_swears = total_swears + 1,
             total_fine = total_fine + ?2,
             last_active = ?3
         WHERE id = ?1",
        params![user_id, fine_amount, now.to_rfc3339()],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("user", user_id));
    }
    Ok(())
}

/// Remove one deleted event from the user's running totals.
pub(crate) fn debit_totals(
    conn: &Connection,
    user_id: &str,
    fine_amount: f64,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE users
         SET total_swears = MAX(total_swears - 1, 0),
             total_fine = MAX(total_fine - ?2, 0)
         WHERE id = ?1",
        params![user_id, fine_amount],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("user", user_id));
    }
    Ok(())
}

/// Zero the cached totals. Log and streak history is left intact; the
/// cached totals are authoritative after a reset.
pub(crate) fn reset_totals(conn: &Connection, user_id: &str) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE users SET total_swears = 0, total_fine = 0 WHERE id = ?1",
        params![user_id],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("user", user_id));
    }
    log::info!("[reset_totals] statistics reset for user {user_id}");
    Ok(())
}

/// Refresh the denormalized streak-day cache.
pub(crate) fn set_streak_days(
    conn: &Connection,
    user_id: &str,
    days: u32,
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE users SET streak_days = ?2 WHERE id = ?1",
        params![user_id, days],
    )?;
    Ok(())
}

/// Delete a user and every dependent row in one pass.
///
/// Caller wraps this in a transaction.
pub(crate) fn delete_user_cascade(conn: &Connection, user_id: &str) -> Result<(), StoreError> {
    for sql in [
        "DELETE FROM user_words WHERE user_id = ?1",
        "DELETE FROM swear_logs WHERE user_id = ?1",
        "DELETE FROM user_settings WHERE user_id = ?1",
        "DELETE FROM streak_history WHERE user_id = ?1",
        "DELETE FROM daily_summaries WHERE user_id = ?1",
    ] {
        conn.execute(sql, params![user_id])?;
    }
    let changed = conn.execute("DELETE FROM users WHERE id = ?1", params![user_id])?;
    if changed == 0 {
        return Err(StoreError::not_found("user", user_id));
    }
    log::info!("[delete_user_cascade] user {user_id} deleted");
    Ok(())
}

// === settings ===

fn row_to_settings(row: &rusqlite::Row) -> Result<UserSettings, rusqlite::Error> {
    Ok(UserSettings {
        user_id: row.get("user_id")?,
        notifications_enabled: row.get("notifications_enabled")?,
        dark_mode: row.get("dark_mode")?,
        reminder_time: row.get("reminder_time")?,
        share_stats: row.get("share_stats")?,
        auto_location: row.get("auto_location")?,
    })
}

pub(crate) fn insert_settings(
    conn: &Connection,
    settings: &UserSettings,
) -> Result<(), StoreError> {
    conn.execute(
        "INSERT INTO user_settings (user_id, notifications_enabled, dark_mode,
                                    reminder_time, share_stats, auto_location)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            settings.user_id,
            settings.notifications_enabled,
            settings.dark_mode,
            settings.reminder_time,
            settings.share_stats,
            settings.auto_location,
        ],
    )?;
    Ok(())
}

pub(crate) fn get_settings(
    conn: &Connection,
    user_id: &str,
) -> Result<Option<UserSettings>, StoreError> {
    Ok(conn
        .prepare("SELECT * FROM user_settings WHERE user_id = ?1")?
        .query_row(params![user_id], row_to_settings)
        .optional()?)
}

pub(crate) fn update_settings(
    conn: &Connection,
    settings: &UserSettings,
) -> Result<(), StoreError> {
    let changed = conn.execute(
        "UPDATE user_settings SET
            notifications_enabled = ?2,
            dark_mode = ?3,
            reminder_time = ?4,
            share_stats = ?5,
            auto_location = ?6
         WHERE user_id = ?1",
        params![
            settings.user_id,
            settings.notifications_enabled,
            settings.dark_mode,
            settings.reminder_time,
            settings.share_stats,
            settings.auto_location,
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::not_found("user_settings", &settings.user_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Database;
    use uuid::Uuid;

    fn make_user(username: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            display_name: None,
            created_at: now,
            last_active: now,
            streak_days: 0,
            total_swears: 0,
            total_fine: 0.0,
        }
    }

    #[test]
    fn insert_and_get() {
        let db = Database::open_memory().unwrap();
        let user = make_user("alice");
        insert_user(db.conn(), &user).unwrap();

        let fetched = get_user(db.conn(), &user.id).unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert_eq!(fetched.total_swears, 0);

        let by_name = get_user_by_username(db.conn(), "alice").unwrap().unwrap();
        assert_eq!(by_name.id, user.id);
    }

    #[test]
    fn duplicate_username_rejected() {
        let db = Database::open_memory().unwrap();
        insert_user(db.conn(), &make_user("bob")).unwrap();
        let err = insert_user(db.conn(), &make_user("bob")).unwrap_err();
        assert!(matches!(err, StoreError::UsernameTaken(name) if name == "bob"));
    }

    #[test]
    fn bump_and_reset_totals() {
        let db = Database::open_memory().unwrap();
        let user = make_user("carol");
        insert_user(db.conn(), &user).unwrap();

        bump_totals(db.conn(), &user.id, 0.25, Utc::now()).unwrap();
        bump_totals(db.conn(), &user.id, 1.0, Utc::now()).unwrap();
        let fetched = get_user(db.conn(), &user.id).unwrap().unwrap();
        assert_eq!(fetched.total_swears, 2);
        assert!((fetched.total_fine - 1.25).abs() < 1e-9);

        reset_totals(db.conn(), &user.id).unwrap();
        let fetched = get_user(db.conn(), &user.id).unwrap().unwrap();
        assert_eq!(fetched.total_swears, 0);
        assert_eq!(fetched.total_fine, 0.0);
    }

    #[test]
    fn bump_totals_unknown_user() {
        let db = Database::open_memory().unwrap();
        let err = bump_totals(db.conn(), "nope", 0.25, Utc::now()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn corrupt_timestamp_surfaces_as_error() {
        let db = Database::open_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO users (id, username, created_at, last_active)
                 VALUES ('u1', 'eve', 'not-a-timestamp', 'not-a-timestamp')",
                [],
            )
            .unwrap();

        let err = get_user(db.conn(), "u1").unwrap_err();
        assert!(matches!(err, StoreError::StorageFailure(_)));
    }

    #[test]
    fn settings_lifecycle() {
        let db = Database::open_memory().unwrap();
        let user = make_user("dave");
        insert_user(db.conn(), &user).unwrap();

        let mut settings = UserSettings::defaults_for(&user.id);
        insert_settings(db.conn(), &settings).unwrap();

        settings.dark_mode = true;
        settings.reminder_time = Some("21:30".to_string());
        update_settings(db.conn(), &settings).unwrap();

        let fetched = get_settings(db.conn(), &user.id).unwrap().unwrap();
        assert!(fetched.dark_mode);
        assert_eq!(fetched.reminder_time.as_deref(), Some("21:30"));
    }
}
