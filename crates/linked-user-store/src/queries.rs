//! Standalone query functions that work with any Connection.

use crate::{DuplicateKey, LinkedUser, NewLinkedUser, UserStoreError, UserStoreResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, ErrorCode};

/// Insert a new link. Collisions on either identity yield `Duplicate`.
pub fn insert_user(conn: &Connection, user: &NewLinkedUser) -> UserStoreResult<LinkedUser> {
    let now = Utc::now();
    conn.execute(
        "INSERT INTO users (chat_id, forum_id, linked_at) VALUES (?1, ?2, ?3)",
        params![user.chat_id, user.forum_id, now.to_rfc3339()],
    )
    .map_err(map_constraint)?;

    get_user_by_chat(conn, &user.chat_id)?
        .ok_or_else(|| UserStoreError::NotFound("User not found after insert".to_string()))
}

/// Get a link by chat identity.
pub fn get_user_by_chat(conn: &Connection, chat_id: &str) -> UserStoreResult<Option<LinkedUser>> {
    get_user_where(conn, "chat_id", chat_id)
}

/// Get a link by forum identity.
pub fn get_user_by_forum(conn: &Connection, forum_id: &str) -> UserStoreResult<Option<LinkedUser>> {
    get_user_where(conn, "forum_id", forum_id)
}

fn get_user_where(conn: &Connection, column: &str, value: &str) -> UserStoreResult<Option<LinkedUser>> {
    let sql = format!(
        "SELECT chat_id, forum_id, linked_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare_cached(&sql)?;

    let result = stmt.query_row(params![value], |row| {
        Ok(LinkedUser {
            chat_id: row.get(0)?,
            forum_id: row.get(1)?,
            linked_at: parse_datetime(row.get::<_, String>(2)?),
        })
    });

    match result {
        Ok(user) => Ok(Some(user)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Update the forum identity of an existing link, keyed by chat identity.
pub fn update_user(conn: &Connection, user: &LinkedUser) -> UserStoreResult<()> {
    let changed = conn
        .execute(
            "UPDATE users SET forum_id = ?2, linked_at = ?3 WHERE chat_id = ?1",
            params![user.chat_id, user.forum_id, user.linked_at.to_rfc3339()],
        )
        .map_err(map_constraint)?;

    if changed == 0 {
        return Err(UserStoreError::NotFound(format!(
            "no linked user with chat id {}",
            user.chat_id
        )));
    }
    Ok(())
}

fn map_constraint(err: rusqlite::Error) -> UserStoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
        if failure.code == ErrorCode::ConstraintViolation {
            let message = message.as_deref().unwrap_or_default();
            if message.contains("forum_id") {
                return UserStoreError::Duplicate(DuplicateKey::ForumId);
            }
            if message.contains("chat_id") {
                return UserStoreError::Duplicate(DuplicateKey::ChatId);
            }
        }
    }
    UserStoreError::Sqlite(err)
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
