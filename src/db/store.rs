// src/db/store.rs
//
// The transactional store the import pipeline and the buyer service run
// against. `SqliteStorage` is the production implementation; tests wrap it to
// inject transaction failures.

use crate::db::{buyers, history};
use crate::domain::buyer::{Buyer, BuyerDraft};
use crate::domain::history::NewHistoryEntry;
use crate::errors::ServerError;
use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Transaction, TransactionBehavior};
use std::time::{Duration, Instant};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("transaction exceeded its {0:?} budget")]
    Timeout(Duration),
    #[error("database is busy")]
    Busy,
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("record not found")]
    NotFound,
    #[error("sqlite error: {0}")]
    Sqlite(rusqlite::Error),
    #[error("history payload: {0}")]
    Serde(#[from] serde_json::Error),
}

impl StoreError {
    /// Errors after which the enclosing transaction cannot continue.
    pub fn aborts_transaction(&self) -> bool {
        matches!(self, StoreError::Timeout(_) | StoreError::Busy)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        match &e {
            rusqlite::Error::SqliteFailure(err, msg)
                if err.code == ErrorCode::ConstraintViolation
                    && err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
            {
                StoreError::UniqueViolation(msg.clone().unwrap_or_else(|| e.to_string()))
            }
            rusqlite::Error::SqliteFailure(err, _)
                if matches!(err.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
            {
                StoreError::Busy
            }
            _ => StoreError::Sqlite(e),
        }
    }
}

impl From<StoreError> for ServerError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => ServerError::NotFound,
            StoreError::UniqueViolation(_) => {
                ServerError::BadRequest("A buyer with this phone number already exists".into())
            }
            other => ServerError::DbError(other.to_string()),
        }
    }
}

/// Time budget for one transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TxOptions {
    /// Total wall-clock budget from begin to commit.
    pub timeout: Duration,
    /// How long to wait for the write lock before giving up.
    pub max_wait: Duration,
}

impl Default for TxOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            max_wait: Duration::from_secs(2),
        }
    }
}

/// Operations available inside a transaction.
pub trait BuyerStore {
    fn find_buyer(&mut self, id: &str) -> Result<Option<Buyer>, StoreError>;

    fn find_buyer_by_phone(
        &mut self,
        phone: &str,
        excluding: Option<&str>,
    ) -> Result<Option<Buyer>, StoreError>;

    fn insert_buyer(
        &mut self,
        draft: &BuyerDraft,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Buyer, StoreError>;

    fn update_buyer(
        &mut self,
        id: &str,
        draft: &BuyerDraft,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    fn delete_buyer(&mut self, id: &str) -> Result<(), StoreError>;

    fn append_history(
        &mut self,
        entry: &NewHistoryEntry<'_>,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError>;

    /// Opens a nested scope so one row's writes can be undone on their own.
    fn begin_row(&mut self) -> Result<(), StoreError>;
    fn commit_row(&mut self) -> Result<(), StoreError>;
    fn rollback_row(&mut self) -> Result<(), StoreError>;
}

/// Something that can run a closure inside one atomic transaction.
/// The closure's `Err` rolls everything back.
pub trait Storage {
    fn transaction<T, F>(&mut self, opts: &TxOptions, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn BuyerStore) -> Result<T, StoreError>;
}

pub struct SqliteStorage<'c> {
    conn: &'c mut Connection,
}

impl<'c> SqliteStorage<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }
}

impl Storage for SqliteStorage<'_> {
    fn transaction<T, F>(&mut self, opts: &TxOptions, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut dyn BuyerStore) -> Result<T, StoreError>,
    {
        self.conn.busy_timeout(opts.max_wait)?;

        // IMMEDIATE takes the write lock up front so the existence checks and
        // inserts of a batch see a stable table.
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut scoped = SqliteTx {
            tx,
            budget: opts.timeout,
            deadline: Instant::now() + opts.timeout,
        };

        // On error `scoped` drops here and the transaction rolls back.
        let out = f(&mut scoped)?;
        scoped.check_deadline()?;
        scoped.tx.commit()?;
        Ok(out)
    }
}

pub struct SqliteTx<'t> {
    tx: Transaction<'t>,
    budget: Duration,
    deadline: Instant,
}

impl SqliteTx<'_> {
    fn check_deadline(&self) -> Result<(), StoreError> {
        if Instant::now() >= self.deadline {
            return Err(StoreError::Timeout(self.budget));
        }
        Ok(())
    }
}

impl BuyerStore for SqliteTx<'_> {
    fn find_buyer(&mut self, id: &str) -> Result<Option<Buyer>, StoreError> {
        self.check_deadline()?;
        Ok(buyers::find_buyer(&self.tx, id)?)
    }

    fn find_buyer_by_phone(
        &mut self,
        phone: &str,
        excluding: Option<&str>,
    ) -> Result<Option<Buyer>, StoreError> {
        self.check_deadline()?;
        Ok(buyers::find_buyer_by_phone(&self.tx, phone, excluding)?)
    }

    fn insert_buyer(
        &mut self,
        draft: &BuyerDraft,
        owner_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Buyer, StoreError> {
        self.check_deadline()?;
        let id = Uuid::new_v4().to_string();
        Ok(buyers::insert_buyer(&self.tx, &id, draft, owner_id, now)?)
    }

    fn update_buyer(
        &mut self,
        id: &str,
        draft: &BuyerDraft,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.check_deadline()?;
        match buyers::update_buyer(&self.tx, id, draft, now)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    fn delete_buyer(&mut self, id: &str) -> Result<(), StoreError> {
        self.check_deadline()?;
        match buyers::delete_buyer(&self.tx, id)? {
            0 => Err(StoreError::NotFound),
            _ => Ok(()),
        }
    }

    fn append_history(
        &mut self,
        entry: &NewHistoryEntry<'_>,
        now: DateTime<Utc>,
    ) -> Result<i64, StoreError> {
        self.check_deadline()?;
        Ok(history::insert_history(&self.tx, entry, now)?)
    }

    fn begin_row(&mut self) -> Result<(), StoreError> {
        self.check_deadline()?;
        self.tx.execute_batch("SAVEPOINT buyer_row")?;
        Ok(())
    }

    fn commit_row(&mut self) -> Result<(), StoreError> {
        self.tx.execute_batch("RELEASE buyer_row")?;
        Ok(())
    }

    fn rollback_row(&mut self) -> Result<(), StoreError> {
        self.tx
            .execute_batch("ROLLBACK TO buyer_row; RELEASE buyer_row")?;
        Ok(())
    }
}
