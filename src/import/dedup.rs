// src/import/dedup.rs

use crate::db::{BuyerStore, StoreError};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateCheck {
    Unique,
    /// Seen earlier in the same file.
    WithinFile,
    /// Already persisted before this run.
    InStore,
}

impl DuplicateCheck {
    pub fn skip_reason(self) -> Option<&'static str> {
        match self {
            DuplicateCheck::Unique => None,
            DuplicateCheck::WithinFile => Some("Duplicate phone number within this file"),
            DuplicateCheck::InStore => Some("Phone number already exists"),
        }
    }
}

/// Phones accepted during one import run.
///
/// `committed` holds phones from batches whose transaction committed. `pending`
/// holds phones accepted in the open batch; they are promoted on commit and
/// discarded if the batch fails, since those rows were never stored.
#[derive(Debug, Default)]
pub struct PhoneLedger {
    committed: HashSet<String>,
    pending: HashSet<String>,
}

impl PhoneLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies a phone. The in-memory sets are consulted before the store.
    pub fn check(
        &self,
        store: &mut dyn BuyerStore,
        phone: &str,
    ) -> Result<DuplicateCheck, StoreError> {
        if self.committed.contains(phone) || self.pending.contains(phone) {
            return Ok(DuplicateCheck::WithinFile);
        }
        if store.find_buyer_by_phone(phone, None)?.is_some() {
            return Ok(DuplicateCheck::InStore);
        }
        Ok(DuplicateCheck::Unique)
    }

    pub fn accept(&mut self, phone: &str) {
        self.pending.insert(phone.to_string());
    }

    pub fn commit_batch(&mut self) {
        self.committed.extend(self.pending.drain());
    }

    pub fn abandon_batch(&mut self) {
        self.pending.clear();
    }
}
