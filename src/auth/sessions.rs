// src/auth/sessions.rs
use crate::errors::ServerError;
use base64::Engine;
use rand::{rngs::OsRng, RngCore};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};

pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7; // 7 days

/// 32 random bytes, URL-safe base64 without padding (43 chars).
fn new_token() -> String {
    let mut raw = [0u8; 32];
    OsRng.fill_bytes(&mut raw);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(raw)
}

fn token_hash(raw_token: &str) -> [u8; 32] {
    let mut out = [0u8; 32];
    out.copy_from_slice(&Sha256::digest(raw_token.as_bytes()));
    out
}

/// The signed-in user behind a session cookie.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
}

/// Issues a session for `user_id` and returns the raw token for the cookie.
/// Only the SHA-256 of the token is stored.
pub fn create_session(conn: &Connection, user_id: i64, now: i64) -> Result<String, ServerError> {
    let raw_token = new_token();
    let hash = token_hash(&raw_token);
    let expires_at = now + SESSION_TTL_SECS;

    conn.execute(
        r#"
        insert into sessions (user_id, token_hash, created_at, expires_at)
        values (?, ?, ?, ?)
        "#,
        params![user_id, hash.as_slice(), now, expires_at],
    )
    .map_err(|e| ServerError::DbError(format!("create session failed: {e}")))?;

    Ok(raw_token)
}

pub fn load_user_from_session(
    conn: &Connection,
    raw_token: &str,
    now: i64,
) -> Result<Option<SessionUser>, ServerError> {
    let hash = token_hash(raw_token);

    conn.query_row(
        r#"
        select u.id, u.email
        from sessions s
        join users u on u.id = s.user_id
        where s.token_hash = ?
          and s.expires_at > ?
          and s.revoked_at is null
        "#,
        params![hash.as_slice(), now],
        |row| {
            Ok(SessionUser {
                id: row.get(0)?,
                email: row.get(1)?,
            })
        },
    )
    .optional()
    .map_err(|e| ServerError::DbError(format!("session lookup failed: {e}")))
}
