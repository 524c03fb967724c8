// src/auth/mod.rs
//
// Identity only: a request is attributed to whoever owns its session cookie.
// Issuing sessions (sign-in) happens elsewhere.

pub mod sessions;

use crate::errors::ServerError;
use astra::Request;
use rusqlite::Connection;
pub use sessions::{create_session, load_user_from_session, SessionUser};

pub const SESSION_COOKIE: &str = "session";

/// Value of the `session` cookie, if the request carries one.
pub fn session_token(req: &Request) -> Option<String> {
    req.headers()
        .get_all("cookie")
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn current_user(
    req: &Request,
    conn: &Connection,
    now: i64,
) -> Result<Option<SessionUser>, ServerError> {
    match session_token(req) {
        Some(token) => load_user_from_session(conn, &token, now),
        None => Ok(None),
    }
}

/// Like `current_user` but a missing or stale session is a 401.
pub fn require_user(req: &Request, conn: &Connection, now: i64) -> Result<SessionUser, ServerError> {
    current_user(req, conn, now)?.ok_or_else(|| ServerError::Unauthorized("no valid session".into()))
}
