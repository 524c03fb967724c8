// src/db/history.rs
use crate::domain::history::{Actor, HistoryView, NewHistoryEntry};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};

/// Appends one entry to `buyer_history`. Entries are never updated.
pub fn insert_history(
    conn: &Connection,
    entry: &NewHistoryEntry<'_>,
    now: DateTime<Utc>,
) -> rusqlite::Result<i64> {
    let changes = serde_json::to_string(&entry.changes)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

    conn.execute(
        r#"
        INSERT INTO buyer_history (buyer_id, changed_by, changed_at, action, changes)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
        params![entry.buyer_id, entry.changed_by, now, entry.action, changes],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All entries for a buyer, newest first, with the acting user's display fields.
pub fn history_for_buyer(conn: &Connection, buyer_id: &str) -> rusqlite::Result<Vec<HistoryView>> {
    let mut stmt = conn.prepare(
        r#"
        SELECT h.id, h.changed_at, h.action, h.changes, u.name, u.email
        FROM buyer_history h
        JOIN users u ON u.id = h.changed_by
        WHERE h.buyer_id = ?1
        ORDER BY h.changed_at DESC, h.id DESC
        "#,
    )?;

    let rows = stmt.query_map(params![buyer_id], |row| {
        let changes: String = row.get(3)?;
        let diff = serde_json::from_str(&changes)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
        Ok(HistoryView {
            id: row.get(0)?,
            changed_at: row.get(1)?,
            action: row.get(2)?,
            diff,
            changed_by: Actor {
                name: row.get(4)?,
                email: row.get(5)?,
            },
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
