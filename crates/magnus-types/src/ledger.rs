//! Ledger and reconciliation types

use crate::{JournalId, TraceId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A double-entry journal line produced by the reconciliation agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Journal entry identifier
    pub journal_id: JournalId,
    /// Trace the entry was posted for
    pub trace_id: TraceId,
    /// Posted amount
    pub amount: Decimal,
    /// Account debited
    pub debit_account: String,
    /// Account credited
    pub credit_account: String,
    /// Whether the entry matched a bank statement line
    pub matched: bool,
    /// When the entry was posted
    pub posted_at: DateTime<Utc>,
}

/// Snapshot of the recon journal as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Journal entries in posting order
    pub entries: Vec<JournalEntry>,
    /// Count of entries still awaiting a match
    pub unmatched_count: usize,
    /// Backend timestamp for the snapshot
    pub generated_at: DateTime<Utc>,
}

impl LedgerSnapshot {
    /// Entries that still need operator attention
    pub fn unmatched(&self) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(|e| !e.matched)
    }
}
