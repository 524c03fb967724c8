// src/import/orchestrator.rs
//
// Bulk import in two phases. Every row is validated first and any failure
// rejects the file with nothing written. Valid rows are then persisted in
// fixed-size batches, one transaction per batch, so a failed batch costs only
// its own rows.

use crate::audit::record_import;
use crate::db::{BuyerStore, Storage, StoreError, TxOptions};
use crate::domain::buyer::BuyerDraft;
use crate::domain::normalize::{normalize_import_row, RawRow};
use crate::import::dedup::PhoneLedger;
use crate::import::parse::{parse_rows, FileError};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

pub const ROW_FAILED: &str = "Failed to create record in batch";
pub const BATCH_FAILED: &str = "Batch processing failed";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    pub max_rows: usize,
    pub batch_size: usize,
    pub batch_timeout_secs: u64,
    pub max_wait_secs: u64,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_rows: 200,
            batch_size: 20,
            batch_timeout_secs: 30,
            max_wait_secs: 30,
        }
    }
}

impl ImportSettings {
    pub fn tx_options(&self) -> TxOptions {
        TxOptions {
            timeout: Duration::from_secs(self.batch_timeout_secs),
            max_wait: Duration::from_secs(self.max_wait_secs),
        }
    }
}

/// Validation result for one rejected row. `row` counts the header as line 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowValidation {
    pub row: usize,
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRow {
    pub row: usize,
    pub draft: BuyerDraft,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub full_name: String,
    pub phone: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub row: usize,
}

impl RowOutcome {
    fn imported(row: &ValidatedRow, id: String) -> Self {
        Self {
            id: Some(id),
            full_name: row.draft.full_name.clone(),
            phone: row.draft.phone.clone(),
            success: true,
            error: None,
            row: row.row,
        }
    }

    fn failed(row: &ValidatedRow, reason: &str) -> Self {
        Self {
            id: None,
            full_name: row.draft.full_name.clone(),
            phone: row.draft.phone.clone(),
            success: false,
            error: Some(reason.to_string()),
            row: row.row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub message: String,
    pub imported_count: usize,
    pub skipped_count: usize,
    pub imported: Vec<RowOutcome>,
    pub failed: Vec<RowOutcome>,
}

impl ImportReport {
    fn from_outcomes(total: usize, outcomes: Vec<RowOutcome>) -> Self {
        let (imported, failed): (Vec<_>, Vec<_>) = outcomes.into_iter().partition(|o| o.success);
        Self {
            message: format!(
                "Imported {} of {} records successfully",
                imported.len(),
                total
            ),
            imported_count: imported.len(),
            skipped_count: failed.len(),
            imported,
            failed,
        }
    }
}

pub fn failed_validation_message(count: usize) -> String {
    format!("{count} records failed validation")
}

#[derive(Debug, Error)]
pub enum ImportError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error("{}", failed_validation_message(.0.len()))]
    Validation(Vec<RowValidation>),
}

/// Normalizes every row. Either all rows pass or every failing row is reported.
pub fn validate_all(rows: &[RawRow]) -> Result<Vec<ValidatedRow>, Vec<RowValidation>> {
    let mut valid = Vec::with_capacity(rows.len());
    let mut rejected = Vec::new();

    for (i, raw) in rows.iter().enumerate() {
        let row = i + 2;
        match normalize_import_row(raw) {
            Ok(draft) => valid.push(ValidatedRow { row, draft }),
            Err(errors) => rejected.push(RowValidation {
                row,
                valid: false,
                errors: errors.iter().map(ToString::to_string).collect(),
            }),
        }
    }

    if rejected.is_empty() {
        Ok(valid)
    } else {
        Err(rejected)
    }
}

/// Writes validated rows batch by batch and returns one outcome per row, in file order.
pub fn persist<S: Storage>(
    storage: &mut S,
    rows: &[ValidatedRow],
    actor: i64,
    settings: &ImportSettings,
) -> Vec<RowOutcome> {
    let opts = settings.tx_options();
    let mut ledger = PhoneLedger::new();
    let mut outcomes = Vec::with_capacity(rows.len());

    for (n, batch) in rows.chunks(settings.batch_size.max(1)).enumerate() {
        let result =
            storage.transaction(&opts, |tx| import_batch(tx, &mut ledger, batch, actor));

        match result {
            Ok(batch_outcomes) => {
                ledger.commit_batch();
                outcomes.extend(batch_outcomes);
            }
            Err(e) => {
                ledger.abandon_batch();
                error!(batch = n + 1, rows = batch.len(), error = %e, "import batch failed");
                outcomes.extend(batch.iter().map(|row| RowOutcome::failed(row, BATCH_FAILED)));
            }
        }
    }

    outcomes
}

fn import_batch(
    tx: &mut dyn BuyerStore,
    ledger: &mut PhoneLedger,
    batch: &[ValidatedRow],
    actor: i64,
) -> Result<Vec<RowOutcome>, StoreError> {
    let mut outcomes = Vec::with_capacity(batch.len());
    for row in batch {
        match import_row(tx, ledger, row, actor) {
            Ok(outcome) => outcomes.push(outcome),
            Err(e) if e.aborts_transaction() => return Err(e),
            Err(e) => {
                warn!(row = row.row, error = %e, "import row failed");
                outcomes.push(RowOutcome::failed(row, ROW_FAILED));
            }
        }
    }
    Ok(outcomes)
}

fn import_row(
    tx: &mut dyn BuyerStore,
    ledger: &mut PhoneLedger,
    row: &ValidatedRow,
    actor: i64,
) -> Result<RowOutcome, StoreError> {
    let check = ledger.check(tx, &row.draft.phone)?;
    if let Some(reason) = check.skip_reason() {
        return Ok(RowOutcome::failed(row, reason));
    }

    tx.begin_row()?;
    let released = match create_with_history(tx, row, actor) {
        Ok(id) => tx.commit_row().map(|()| id),
        Err(e) => Err(e),
    };
    match released {
        Ok(id) => {
            ledger.accept(&row.draft.phone);
            Ok(RowOutcome::imported(row, id))
        }
        Err(e) => {
            // The savepoint is still open after a failed insert or release.
            tx.rollback_row()?;
            Err(e)
        }
    }
}

fn create_with_history(
    tx: &mut dyn BuyerStore,
    row: &ValidatedRow,
    actor: i64,
) -> Result<String, StoreError> {
    let now = Utc::now();
    let buyer = tx.insert_buyer(&row.draft, actor, now)?;
    record_import(tx, &buyer.id, actor, &row.draft, now)?;
    Ok(buyer.id)
}

/// Parses, validates and persists one uploaded CSV file.
pub fn import_csv<S: Storage>(
    storage: &mut S,
    text: &str,
    actor: i64,
    settings: &ImportSettings,
) -> Result<ImportReport, ImportError> {
    let rows = parse_rows(text, settings.max_rows)?;
    info!(rows = rows.len(), actor, "import parsed");

    let valid = validate_all(&rows).map_err(|rejected| {
        info!(rejected = rejected.len(), "import rejected by validation");
        ImportError::Validation(rejected)
    })?;

    let report = ImportReport::from_outcomes(valid.len(), persist(storage, &valid, actor, settings));
    info!(
        imported = report.imported_count,
        skipped = report.skipped_count,
        "import finished"
    );
    Ok(report)
}
