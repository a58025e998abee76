//! Live queue and rail health types

use crate::{PaymentStatus, Rail, TraceId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A transaction moving through the dispatch queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueTransaction {
    /// Orchestration trace identifier
    pub trace_id: TraceId,
    /// Transaction amount
    pub amount: Decimal,
    /// Rail selected (or proposed) by the router
    pub rail: Rail,
    /// Current lifecycle status
    pub status: PaymentStatus,
    /// Next processing step (e.g. "ACC Check", "PDR Selection")
    pub next_action: Option<String>,
    /// When the transaction entered the queue
    pub enqueued_at: DateTime<Utc>,
    /// Unique transaction reference once dispatched
    pub utr: Option<String>,
}

impl QueueTransaction {
    /// Whether the operator can retry the dispatch
    pub fn can_retry(&self) -> bool {
        self.status == PaymentStatus::Failed
    }

    /// Whether the operator can cancel before dispatch
    pub fn can_cancel(&self) -> bool {
        matches!(
            self.status,
            PaymentStatus::Pending | PaymentStatus::Approved | PaymentStatus::Processing
        )
    }
}

/// Snapshot of the live dispatch queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveQueueSnapshot {
    /// Transactions currently visible in the queue
    pub transactions: Vec<QueueTransaction>,
    /// Backend timestamp for the snapshot
    pub generated_at: DateTime<Utc>,
}

/// Health reading for one payment rail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RailHealth {
    /// Rail the reading is for
    pub rail: Rail,
    /// Dispatch success rate over the sampling window, 0..=1
    pub success_rate: f64,
    /// Average confirmation latency in milliseconds
    pub avg_latency_ms: u64,
    /// Whether the rail is currently flagged degraded
    pub degraded: bool,
    /// When the reading was taken
    pub observed_at: DateTime<Utc>,
}
