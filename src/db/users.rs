// src/db/users.rs
use crate::domain::history::Actor;
use crate::errors::ServerError;
use rusqlite::{params, Connection, OptionalExtension};

/// Insert a user if they don't exist, then return the user id.
/// Email should already be normalized by caller (trim/lowercase).
pub fn get_or_create_user(
    conn: &Connection,
    email: &str,
    name: Option<&str>,
    now: i64,
) -> Result<i64, ServerError> {
    conn.execute(
        "insert or ignore into users (email, name, created_at) values (?, ?, ?)",
        params![email, name, now],
    )
    .map_err(|e| ServerError::DbError(format!("insert user failed: {e}")))?;

    let id: i64 = conn
        .query_row(
            "select id from users where email = ?",
            params![email],
            |row| row.get(0),
        )
        .map_err(|e| ServerError::DbError(format!("select user id failed: {e}")))?;

    Ok(id)
}

pub fn find_actor(conn: &Connection, user_id: i64) -> Result<Option<Actor>, ServerError> {
    conn.query_row(
        "select name, email from users where id = ?",
        params![user_id],
        |row| {
            Ok(Actor {
                name: row.get(0)?,
                email: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("select user failed: {e}")))
}
