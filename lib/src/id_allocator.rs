// lib/src/id_allocator.rs

use std::collections::HashMap;

use clinic_models::errors::{ClinicError, ClinicResult};
use clinic_models::identifiers::{RecordId, RecordKind};

/// Hands out record identities. The next sequence for a kind is one past the
/// larger of the highest sequence already stored and the last one issued, so
/// identities never repeat even when rows are unreadable or an append fails.
///
/// Callers must hold the database write gate while allocating and appending.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last_issued: HashMap<RecordKind, u32>,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator::default()
    }

    pub fn next<I>(&mut self, kind: RecordKind, existing: I) -> ClinicResult<RecordId>
    where
        I: IntoIterator<Item = RecordId>,
    {
        let highest_stored = existing
            .into_iter()
            .filter(|id| id.kind() == kind)
            .map(|id| id.sequence())
            .max()
            .unwrap_or(0);
        let last = self.last_issued.get(&kind).copied().unwrap_or(0);
        let sequence = highest_stored
            .max(last)
            .checked_add(1)
            .ok_or_else(|| ClinicError::StorageError(format!("{} identity space exhausted", kind)))?;
        self.last_issued.insert(kind, sequence);
        Ok(RecordId::new(kind, sequence))
    }

    pub fn last_issued(&self, kind: RecordKind) -> Option<RecordId> {
        self.last_issued.get(&kind).map(|sequence| RecordId::new(kind, *sequence))
    }
}
