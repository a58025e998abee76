//! Magnus Types - Canonical domain types for the Arealis Magnus dashboards
//!
//! This crate contains all foundational types for the Magnus frontend with
//! zero dependencies on other magnus crates. It defines the records the
//! dashboards mirror from the orchestration backend:
//!
//! - Identity types (TraceId, InvoiceId, JournalId, etc.)
//! - Payment lifecycle types (status, urgency, rails)
//! - Vendor invoices (approvals dashboard)
//! - Queue transactions and rail health (live queue, rail health)
//! - Journal entries (ledger/recon)
//! - Audit filings and investigation cases
//!
//! The authoritative copy of every record lives behind the backend API;
//! these types describe the mirrored snapshots the views render.

pub mod audit;
pub mod error;
pub mod identity;
pub mod invoice;
pub mod ledger;
pub mod payment;
pub mod queue;

pub use audit::*;
pub use error::*;
pub use identity::*;
pub use invoice::*;
pub use ledger::*;
pub use payment::*;
pub use queue::*;

/// Version of the Magnus types schema
pub const TYPES_VERSION: &str = "0.1.0";
