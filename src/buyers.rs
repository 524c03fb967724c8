// src/buyers.rs
//
// Interactive single-record flows. Each runs in one transaction so the buyer
// row and its history entry commit together.

use crate::audit::record_change;
use crate::db::{Storage, StoreError, TxOptions};
use crate::domain::buyer::{Buyer, BuyerDraft};
use crate::domain::diff::{deletion_diff, diff_buyers};
use crate::domain::history::HistoryAction;
use chrono::Utc;
use tracing::info;

fn phone_taken(phone: &str) -> StoreError {
    StoreError::UniqueViolation(format!("buyers.phone = {phone}"))
}

pub fn create_buyer<S: Storage>(
    storage: &mut S,
    opts: &TxOptions,
    draft: &BuyerDraft,
    actor: i64,
) -> Result<Buyer, StoreError> {
    let buyer = storage.transaction(opts, |tx| {
        if tx.find_buyer_by_phone(&draft.phone, None)?.is_some() {
            return Err(phone_taken(&draft.phone));
        }

        let now = Utc::now();
        let buyer = tx.insert_buyer(draft, actor, now)?;
        record_change(
            tx,
            &buyer.id,
            actor,
            HistoryAction::Create,
            &diff_buyers(None, draft),
            now,
        )?;
        Ok(buyer)
    })?;

    info!(buyer_id = %buyer.id, actor, "buyer created");
    Ok(buyer)
}

/// Applies a validated form to an existing buyer. A no-op update writes no history.
pub fn update_buyer<S: Storage>(
    storage: &mut S,
    opts: &TxOptions,
    id: &str,
    draft: &BuyerDraft,
    actor: i64,
) -> Result<Buyer, StoreError> {
    storage.transaction(opts, |tx| {
        let current = tx.find_buyer(id)?.ok_or(StoreError::NotFound)?;

        if current.attrs.phone != draft.phone
            && tx.find_buyer_by_phone(&draft.phone, Some(id))?.is_some()
        {
            return Err(phone_taken(&draft.phone));
        }

        let now = Utc::now();
        tx.update_buyer(id, draft, now)?;

        let diff = diff_buyers(Some(&current.attrs), draft);
        if record_change(tx, id, actor, HistoryAction::Update, &diff, now)?.is_some() {
            info!(buyer_id = id, actor, fields = diff.len(), "buyer updated");
        }

        Ok(Buyer {
            attrs: draft.clone(),
            updated_at: now,
            ..current
        })
    })
}

/// Records the deletion, then removes the buyer.
pub fn delete_buyer<S: Storage>(
    storage: &mut S,
    opts: &TxOptions,
    id: &str,
    actor: i64,
) -> Result<(), StoreError> {
    storage.transaction(opts, |tx| {
        let current = tx.find_buyer(id)?.ok_or(StoreError::NotFound)?;
        record_change(
            tx,
            id,
            actor,
            HistoryAction::Delete,
            &deletion_diff(&current.attrs),
            Utc::now(),
        )?;
        tx.delete_buyer(id)
    })?;

    info!(buyer_id = id, actor, "buyer deleted");
    Ok(())
}
