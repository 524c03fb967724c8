// src/audit.rs
//
// History recording. Interactive create/update/delete write only non-empty
// diffs; imports always write one entry carrying the imported row.

use crate::db::{BuyerStore, StoreError};
use crate::domain::buyer::BuyerDraft;
use crate::domain::diff::Diff;
use crate::domain::history::{HistoryAction, NewHistoryEntry};
use chrono::{DateTime, Utc};

/// Appends a diff entry. Returns `None` without writing when the diff is empty.
pub fn record_change(
    store: &mut dyn BuyerStore,
    buyer_id: &str,
    actor: i64,
    action: HistoryAction,
    diff: &Diff,
    now: DateTime<Utc>,
) -> Result<Option<i64>, StoreError> {
    if diff.is_empty() {
        return Ok(None);
    }

    let changes = serde_json::to_value(diff)?;
    let id = store.append_history(
        &NewHistoryEntry {
            buyer_id,
            changed_by: actor,
            action,
            changes,
        },
        now,
    )?;
    Ok(Some(id))
}

/// Appends the IMPORT entry for a freshly imported buyer.
pub fn record_import(
    store: &mut dyn BuyerStore,
    buyer_id: &str,
    actor: i64,
    row: &BuyerDraft,
    now: DateTime<Utc>,
) -> Result<i64, StoreError> {
    let changes = serde_json::to_value(row)?;
    store.append_history(
        &NewHistoryEntry {
            buyer_id,
            changed_by: actor,
            action: HistoryAction::Import,
            changes,
        },
        now,
    )
}
