//! Payment lifecycle types shared across the dashboards

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment rail a transaction is routed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Rail {
    /// Immediate Payment Service
    Imps,
    /// National Electronic Funds Transfer
    Neft,
    /// Real Time Gross Settlement
    Rtgs,
    /// Unified Payments Interface
    Upi,
}

impl Rail {
    /// All rails the router can pick from
    pub const ALL: [Rail; 4] = [Rail::Imps, Rail::Neft, Rail::Rtgs, Rail::Upi];
}

impl fmt::Display for Rail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rail::Imps => "IMPS",
            Rail::Neft => "NEFT",
            Rail::Rtgs => "RTGS",
            Rail::Upi => "UPI",
        };
        write!(f, "{name}")
    }
}

/// Status of a payment in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// Awaiting an approval decision
    Pending,
    /// Approved, not yet dispatched
    Approved,
    /// Rejected by an approver
    Rejected,
    /// Dispatched to a rail, awaiting confirmation
    Processing,
    /// Confirmed by the rail
    Completed,
    /// Rail reported a failure
    Failed,
    /// Cancelled before dispatch
    Cancelled,
}

impl PaymentStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }

    /// Check if an approver can still act on the payment
    pub fn is_actionable(&self) -> bool {
        matches!(self, Self::Pending | Self::Failed)
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Processing => "Processing",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
        };
        write!(f, "{name}")
    }
}

/// Approval urgency derived from the payment amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    /// Above the high-value threshold, surfaced first to approvers
    High,
    /// Everything else
    Standard,
}

impl Urgency {
    /// Amounts above this are treated as high urgency
    pub const HIGH_VALUE_THRESHOLD: u64 = 50_000;

    /// Derive urgency from a payment amount
    pub fn for_amount(amount: Decimal) -> Self {
        if amount > Decimal::from(Self::HIGH_VALUE_THRESHOLD) {
            Self::High
        } else {
            Self::Standard
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::High => "High",
            Self::Standard => "Standard",
        };
        write!(f, "{name}")
    }
}
