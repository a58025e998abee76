//! Projection wiring for the Magnus domain types
//!
//! Each dashboard's searchable fields and filter dimensions, as one
//! `Projectable` impl per record type.

use crate::project::Projectable;
use chrono::{DateTime, Utc};
use magnus_types::{
    AuditFiling, InvestigationCase, JournalEntry, QueueTransaction, RailHealth, VendorInvoice,
};

impl Projectable for VendorInvoice {
    fn logical_key(&self) -> String {
        self.invoice_id.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        vec![self.invoice_id.to_string(), self.beneficiary_label()]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "urgency" => Some(self.urgency().to_string()),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.issued_at)
    }
}

impl Projectable for QueueTransaction {
    fn logical_key(&self) -> String {
        self.trace_id.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        let mut fields = vec![self.trace_id.to_string()];
        if let Some(utr) = &self.utr {
            fields.push(utr.clone());
        }
        fields
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "rail" => Some(self.rail.to_string()),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.enqueued_at)
    }
}

impl Projectable for JournalEntry {
    fn logical_key(&self) -> String {
        self.journal_id.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        vec![
            self.journal_id.to_string(),
            self.trace_id.to_string(),
            self.debit_account.clone(),
            self.credit_account.clone(),
        ]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "matched" => Some(if self.matched { "matched" } else { "unmatched" }.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.posted_at)
    }
}

impl Projectable for AuditFiling {
    fn logical_key(&self) -> String {
        self.filing_id.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        vec![
            self.filing_id.to_string(),
            self.trace_id.to_string(),
            self.filing_type.clone(),
        ]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "type" => Some(self.filing_type.clone()),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.filed_at)
    }
}

impl Projectable for InvestigationCase {
    fn logical_key(&self) -> String {
        self.case_id.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        vec![
            self.case_id.to_string(),
            self.trace_id.to_string(),
            self.summary.clone(),
        ]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "severity" => Some(self.severity.to_string()),
            "status" => Some(self.status.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.opened_at)
    }
}

impl Projectable for RailHealth {
    fn logical_key(&self) -> String {
        self.rail.to_string()
    }

    fn search_haystack(&self) -> Vec<String> {
        vec![self.rail.to_string()]
    }

    fn facet(&self, name: &str) -> Option<String> {
        match name {
            "degraded" => Some(if self.degraded { "degraded" } else { "healthy" }.to_string()),
            _ => None,
        }
    }

    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        Some(self.observed_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{project, FilterState, PageWindow};
    use magnus_types::{
        CaseId, CaseSeverity, CaseStatus, FilingId, FilingStatus, InvoiceId, PaymentStatus,
        TraceId,
    };
    use rust_decimal_macros::dec;

    fn invoice(id: &str, vendor: &str, amount: rust_decimal::Decimal) -> VendorInvoice {
        VendorInvoice {
            invoice_id: InvoiceId::from(id),
            vendor: vendor.to_string(),
            amount,
            status: PaymentStatus::Pending,
            issued_at: Utc::now(),
        }
    }

    #[test]
    fn urgency_facet_filters_high_value_invoices() {
        let items = vec![
            invoice("INV-1", "Acme Metals", dec!(72000)),
            invoice("INV-2", "Blue Freight", dec!(18000)),
        ];

        let mut filters = FilterState::new();
        filters.set_facet("urgency", "high");
        let projection = project(&items, &filters, PageWindow::default());

        assert_eq!(projection.total, 1);
        assert_eq!(projection.rows[0].invoice_id, InvoiceId::from("INV-1"));
    }

    #[test]
    fn search_matches_vendor_via_beneficiary_label() {
        let items = vec![
            invoice("INV-1", "Acme Metals", dec!(72000)),
            invoice("INV-2", "Blue Freight", dec!(18000)),
        ];

        let mut filters = FilterState::new();
        filters.query = "blue".to_string();
        let projection = project(&items, &filters, PageWindow::default());

        assert_eq!(projection.total, 1);
        assert_eq!(projection.rows[0].invoice_id, InvoiceId::from("INV-2"));
    }

    #[test]
    fn status_facets_render_display_names() {
        let filing = AuditFiling {
            filing_id: FilingId::from("FIL-001"),
            trace_id: TraceId::from("TRC-2024-001230"),
            filing_type: "GST".to_string(),
            status: FilingStatus::Ready,
            download_url: None,
            filed_at: Utc::now(),
        };
        assert_eq!(filing.facet("status").unwrap(), "Ready");

        let case = InvestigationCase {
            case_id: CaseId::from("CASE-7"),
            trace_id: TraceId::from("TRC-2024-001231"),
            severity: CaseSeverity::High,
            summary: "amount mismatch".to_string(),
            status: CaseStatus::InReview,
            opened_at: Utc::now(),
        };
        assert_eq!(case.facet("status").unwrap(), "In Review");

        // Operator-typed filter values match the rendered names
        let mut filters = FilterState::new();
        filters.set_facet("status", "in review");
        assert!(filters.matches(&case));
    }
}
