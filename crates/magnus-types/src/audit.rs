//! Audit filing and investigation types

use crate::{CaseId, FilingId, TraceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Regulatory format an audit pack can be exported in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilingFormat {
    Csv,
    Xml,
    Pdf,
}

impl fmt::Display for FilingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Csv => "csv",
            Self::Xml => "xml",
            Self::Pdf => "pdf",
        };
        write!(f, "{name}")
    }
}

/// Status of an audit filing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingStatus {
    /// Evidence still being assembled
    Assembling,
    /// Pack generated and downloadable
    Ready,
    /// Submitted to the regulator
    Filed,
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Assembling => "Assembling",
            Self::Ready => "Ready",
            Self::Filed => "Filed",
        };
        write!(f, "{name}")
    }
}

/// One audit filing row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFiling {
    /// Filing identifier
    pub filing_id: FilingId,
    /// Trace the filing covers
    pub trace_id: TraceId,
    /// Filing kind (e.g. "GST", "TDS", "FEMA")
    pub filing_type: String,
    /// Current status
    pub status: FilingStatus,
    /// Pre-generated pack URL, if the pack already exists
    pub download_url: Option<String>,
    /// When the filing record was created
    pub filed_at: DateTime<Utc>,
}

impl AuditFiling {
    /// Whether the pack can be downloaded without regenerating it
    pub fn is_downloadable(&self) -> bool {
        self.download_url.is_some() && self.status != FilingStatus::Assembling
    }
}

/// Severity of an investigation case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CaseSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for CaseSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        };
        write!(f, "{name}")
    }
}

/// Status of an investigation case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CaseStatus {
    Open,
    InReview,
    Resolved,
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "Open",
            Self::InReview => "In Review",
            Self::Resolved => "Resolved",
        };
        write!(f, "{name}")
    }
}

/// An exception/investigation case opened against a trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestigationCase {
    /// Case identifier
    pub case_id: CaseId,
    /// Trace under investigation
    pub trace_id: TraceId,
    /// Triage severity
    pub severity: CaseSeverity,
    /// One-line case summary
    pub summary: String,
    /// Current case status
    pub status: CaseStatus,
    /// When the case was opened
    pub opened_at: DateTime<Utc>,
}
