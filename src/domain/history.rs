// src/domain/history.rs

use chrono::{DateTime, Utc};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use serde_json::Value;

/// Which kind of mutation produced a history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
    Import,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Create => "CREATE",
            HistoryAction::Update => "UPDATE",
            HistoryAction::Delete => "DELETE",
            HistoryAction::Import => "IMPORT",
        }
    }
}

impl ToSql for HistoryAction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for HistoryAction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "CREATE" => Ok(HistoryAction::Create),
            "UPDATE" => Ok(HistoryAction::Update),
            "DELETE" => Ok(HistoryAction::Delete),
            "IMPORT" => Ok(HistoryAction::Import),
            other => Err(FromSqlError::Other(
                format!("unknown history action '{other}'").into(),
            )),
        }
    }
}

/// An entry about to be appended to `buyer_history`.
#[derive(Debug, Clone)]
pub struct NewHistoryEntry<'a> {
    pub buyer_id: &'a str,
    pub changed_by: i64,
    pub action: HistoryAction,
    pub changes: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Actor {
    pub name: Option<String>,
    pub email: String,
}

/// A stored history entry joined with the acting user's display fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryView {
    pub id: i64,
    pub changed_at: DateTime<Utc>,
    pub action: HistoryAction,
    pub changed_by: Actor,
    pub diff: Value,
}
