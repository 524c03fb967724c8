// src/handlers/mod.rs
//
// Request plumbing shared by the route handlers.

pub mod buyers;
pub mod export;
pub mod import;
pub mod pages;

use crate::auth::{self, SessionUser};
use crate::db::buyers::count_buyers;
use crate::domain::buyer::BuyerFilter;
use crate::errors::ServerError;
use crate::router::App;
use astra::Request;
use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

pub fn now_unix() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

pub fn query_params(req: &Request) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| url::form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

pub fn header<'r>(req: &'r Request, name: &str) -> Option<&'r str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

/// Reads the whole request body, refusing anything past `limit` bytes.
pub fn read_body(req: Request, limit: usize) -> Result<Vec<u8>, ServerError> {
    let mut body = req.into_body();
    let mut buf = Vec::new();
    body.reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut buf)
        .map_err(|_| ServerError::BadRequest("Could not read request body".into()))?;

    if buf.len() > limit {
        return Err(ServerError::BadRequest("Request body is too large".into()));
    }
    Ok(buf)
}

pub fn require_user(req: &Request, app: &App) -> Result<SessionUser, ServerError> {
    app.db
        .with_conn(|conn| auth::require_user(req, conn, now_unix()))
}

pub fn optional_user(req: &Request, app: &App) -> Result<Option<SessionUser>, ServerError> {
    app.db
        .with_conn(|conn| auth::current_user(req, conn, now_unix()))
}

fn enum_param<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ServerError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(v) => v
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ServerError::BadRequest(format!("{key}: {e}"))),
    }
}

/// The shared list/export filters from the query string.
pub fn buyer_filter(params: &HashMap<String, String>) -> Result<BuyerFilter, ServerError> {
    Ok(BuyerFilter {
        search: params.get("search").cloned().filter(|s| !s.trim().is_empty()),
        city: enum_param(params, "city")?,
        property_type: enum_param(params, "propertyType")?,
        status: enum_param(params, "status")?,
        timeline: enum_param(params, "timeline")?,
    })
}

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// `page` is at least 1 and `limit` is clamped to 1..=100. Unparseable values
/// fall back to the defaults.
pub fn pagination(params: &HashMap<String, String>) -> (u32, u32) {
    let page = params
        .get("page")
        .and_then(|p| p.parse::<u32>().ok())
        .unwrap_or(1)
        .max(1);
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<u32>().ok())
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    (page, limit)
}

/// Total buyers, for the home page.
pub fn buyer_total(app: &App) -> Result<i64, ServerError> {
    app.db.with_conn(|conn| Ok(count_buyers(conn)?))
}
