//! Identity types for Arealis Magnus
//!
//! Backend-assigned identifiers (trace IDs, invoice IDs, journal IDs) are
//! opaque strings minted by the orchestration layer, so they are wrapped as
//! string newtypes to prevent accidental mixing. Locally minted IDs (query
//! log entries) are UUID-backed.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Macro to generate backend-assigned string ID types
macro_rules! define_string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Wrap a backend-assigned identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Last four characters, used for masked display labels
            pub fn last4(&self) -> &str {
                // Character-based, not byte-based: IDs are opaque strings
                // and may carry multi-byte characters
                let start = self.0.char_indices().rev().nth(3).map_or(0, |(i, _)| i);
                &self.0[start..]
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

define_string_id!(TraceId, "Orchestration trace identifier (e.g. TRC-2024-001234)");
define_string_id!(InvoiceId, "Vendor invoice identifier");
define_string_id!(JournalId, "Ledger journal entry identifier");
define_string_id!(FilingId, "Audit filing identifier");
define_string_id!(CaseId, "Investigation case identifier");

/// Identifier for a locally recorded explainability query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryId(pub Uuid);

impl QueryId {
    /// Create a new random ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for QueryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
