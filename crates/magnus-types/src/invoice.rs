//! Vendor invoice types backing the approvals dashboard

use crate::{InvoiceId, PaymentStatus, Urgency};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A vendor invoice awaiting an approval decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorInvoice {
    /// Backend-assigned invoice identifier
    pub invoice_id: InvoiceId,
    /// Vendor the payment goes to
    pub vendor: String,
    /// Invoice amount in the ledger currency
    pub amount: Decimal,
    /// Current lifecycle status
    pub status: PaymentStatus,
    /// When the invoice was issued
    pub issued_at: DateTime<Utc>,
}

impl VendorInvoice {
    /// Approval urgency derived from the amount
    pub fn urgency(&self) -> Urgency {
        Urgency::for_amount(self.amount)
    }

    /// Masked beneficiary label shown in the approvals table
    pub fn beneficiary_label(&self) -> String {
        format!("{} (****{})", self.vendor, self.invoice_id.last4())
    }
}

/// Snapshot of the vendor payments dataset as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPaymentsSnapshot {
    /// Invoice rows; may contain repeats of one invoice under
    /// different wrapper records
    pub invoices: Vec<VendorInvoice>,
    /// Backend timestamp for the snapshot
    pub generated_at: DateTime<Utc>,
}
