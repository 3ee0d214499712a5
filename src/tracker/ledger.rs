//! Ordered action history. Only append and remove-last are valid mutations.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::tracker::record::{ActionDraft, ActionRecord};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("nothing to undo")]
    EmptyLedger,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ledger {
    records: Vec<ActionRecord>,
    next_id: u64,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records, keeping their stored order.
    pub fn from_records(records: Vec<ActionRecord>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().map_or(1, |id| id + 1);
        Self { records, next_id }
    }

    pub fn append(&mut self, draft: ActionDraft) -> &ActionRecord {
        self.append_at(draft, Utc::now())
    }

    /// Append with an explicit wall-clock time. `createdAt` never goes backwards.
    pub fn append_at(&mut self, draft: ActionDraft, now: DateTime<Utc>) -> &ActionRecord {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let created_at = match self.records.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        self.records.push(draft.into_record(id, created_at));
        &self.records[self.records.len() - 1]
    }

    pub fn undo_last(&mut self) -> Result<ActionRecord, LedgerError> {
        self.records.pop().ok_or(LedgerError::EmptyLedger)
    }

    pub fn all(&self) -> &[ActionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn last(&self) -> Option<&ActionRecord> {
        self.records.last()
    }

    /// Most recent records, newest first.
    pub fn recent(&self, limit: usize) -> impl Iterator<Item = &ActionRecord> {
        self.records.iter().rev().take(limit)
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}
