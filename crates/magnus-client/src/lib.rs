//! Magnus Client - HTTP client for the Arealis orchestration backend
//!
//! The dashboards never talk HTTP directly: this crate owns the wire
//! protocol and exposes the collaborator functions the view core consumes.
//!
//! - **Fetch collaborators** resolve with the current collection snapshot
//!   (vendor payments, live queue, ledger, rail health, investigations,
//!   audit filings) or reject with a transport error
//! - **Mutation collaborators** (approve/reject/retry/cancel/bulk/create)
//!   resolve with a [`MutationOutcome`]; expected business failures come
//!   back as `success: false`, only transport failures reject
//! - **Download collaborators** resolve with a file payload for a
//!   client-initiated save
//!
//! # Example
//!
//! ```ignore
//! use magnus_client::{ClientConfig, MagnusClient};
//!
//! let api = MagnusClient::new(ClientConfig::default())?;
//! let snapshot = api.vendor_payments().await?;
//! let outcome = api.approve_payment(&invoice_id).await?;
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use magnus_types::{
    AuditFiling, FilingFormat, FilingId, InvestigationCase, InvoiceId, JournalEntry, JournalId,
    LedgerSnapshot, LiveQueueSnapshot, QueueTransaction, RailHealth, TraceId, VendorInvoice,
    VendorPaymentsSnapshot,
};
use magnus_view::{CollectionFetcher, DownloadOutcome, FetchError, FetchResult, MutationOutcome};

/// Client errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The transport itself failed
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The backend answered outside 2xx
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<ClientError> for FetchError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Decode(e) => FetchError::Decode(e.to_string()),
            other => FetchError::Transport(other.to_string()),
        }
    }
}

/// Client result type
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend endpoint
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// API key (optional)
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

/// Request body for a payment-creation call
#[derive(Debug, Clone, Serialize)]
pub struct CreatePaymentRequest {
    /// Vendor to pay
    pub vendor: String,
    /// Amount in the ledger currency
    pub amount: rust_decimal::Decimal,
    /// Free-text purpose shown to approvers
    pub purpose: String,
}

/// Main Magnus backend client
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct MagnusClient {
    config: Arc<ClientConfig>,
    client: Client,
}

impl MagnusClient {
    /// Create a client with the given configuration
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }

    /// Connect to a specific endpoint with default settings
    pub fn connect(endpoint: &str) -> ClientResult<Self> {
        Self::new(ClientConfig {
            endpoint: endpoint.to_string(),
            ..Default::default()
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.endpoint, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "GET");
        let mut req = self.client.get(&url);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            return Err(ClientError::Api {
                status: resp.status().as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> ClientResult<T> {
        let url = self.url(path);
        debug!(%url, "POST");
        let mut req = self.client.post(&url).json(body);
        if let Some(key) = &self.config.api_key {
            req = req.bearer_auth(key);
        }
        let resp = req.send().await?;

        if !resp.status().is_success() {
            return Err(ClientError::Api {
                status: resp.status().as_u16(),
                message: resp.text().await.unwrap_or_default(),
            });
        }
        Ok(resp.json().await?)
    }

    // ========================================================================
    // Fetch collaborators
    // ========================================================================

    /// Vendor payments awaiting approval
    pub async fn vendor_payments(&self) -> ClientResult<VendorPaymentsSnapshot> {
        self.get_json("/api/v1/payments/vendor").await
    }

    /// Live dispatch queue
    pub async fn live_queue(&self) -> ClientResult<LiveQueueSnapshot> {
        self.get_json("/api/v1/queue/live").await
    }

    /// Recon journal entries
    pub async fn ledger_entries(&self) -> ClientResult<LedgerSnapshot> {
        self.get_json("/api/v1/ledger/recon").await
    }

    /// Per-rail health readings
    pub async fn rail_health(&self) -> ClientResult<Vec<RailHealth>> {
        self.get_json("/api/v1/rails/health").await
    }

    /// Open investigation cases
    pub async fn investigations(&self) -> ClientResult<Vec<InvestigationCase>> {
        self.get_json("/api/v1/investigations").await
    }

    /// Audit filings
    pub async fn audit_filings(&self) -> ClientResult<Vec<AuditFiling>> {
        self.get_json("/api/v1/audit/filings").await
    }

    // ========================================================================
    // Mutation collaborators
    // ========================================================================

    /// Approve one vendor payment
    pub async fn approve_payment(&self, id: &InvoiceId) -> ClientResult<MutationOutcome> {
        self.post_json(&format!("/api/v1/payments/{id}/approve"), &()).await
    }

    /// Reject one vendor payment
    pub async fn reject_payment(&self, id: &InvoiceId) -> ClientResult<MutationOutcome> {
        self.post_json(&format!("/api/v1/payments/{id}/reject"), &()).await
    }

    /// Approve a batch of payments in one call
    pub async fn bulk_approve(&self, ids: &[InvoiceId]) -> ClientResult<MutationOutcome> {
        self.post_json("/api/v1/payments/bulk-approve", &ids).await
    }

    /// Reject a batch of payments in one call
    pub async fn bulk_reject(&self, ids: &[InvoiceId]) -> ClientResult<MutationOutcome> {
        self.post_json("/api/v1/payments/bulk-reject", &ids).await
    }

    /// Retry a failed dispatch
    pub async fn retry_transaction(&self, id: &TraceId) -> ClientResult<MutationOutcome> {
        self.post_json(&format!("/api/v1/queue/{id}/retry"), &()).await
    }

    /// Cancel a queued transaction
    pub async fn cancel_transaction(&self, id: &TraceId) -> ClientResult<MutationOutcome> {
        self.post_json(&format!("/api/v1/queue/{id}/cancel"), &()).await
    }

    /// Re-run statement matching for the whole journal
    pub async fn rerun_matching(&self) -> ClientResult<MutationOutcome> {
        self.post_json("/api/v1/ledger/rematch", &()).await
    }

    /// Raise a dispute against one journal entry
    pub async fn raise_dispute(&self, id: &JournalId) -> ClientResult<MutationOutcome> {
        self.post_json(&format!("/api/v1/ledger/{id}/dispute"), &()).await
    }

    /// Submit a new vendor payment
    pub async fn create_payment(
        &self,
        request: &CreatePaymentRequest,
    ) -> ClientResult<MutationOutcome> {
        self.post_json("/api/v1/payments", request).await
    }

    // ========================================================================
    // Download collaborators
    // ========================================================================

    /// Journal export as CSV
    pub async fn download_journal_csv(&self, id: &JournalId) -> ClientResult<DownloadOutcome> {
        self.get_json(&format!("/api/v1/ledger/{id}/export?format=csv")).await
    }

    /// Bank-facing filing export
    pub async fn download_bank_format(
        &self,
        id: &FilingId,
        format: FilingFormat,
    ) -> ClientResult<DownloadOutcome> {
        self.get_json(&format!("/api/v1/audit/filings/{id}/bank?format={format}"))
            .await
    }

    /// Regulator-facing filing export
    pub async fn download_regulator_format(
        &self,
        id: &FilingId,
        format: FilingFormat,
    ) -> ClientResult<DownloadOutcome> {
        self.get_json(&format!("/api/v1/audit/filings/{id}/regulator?format={format}"))
            .await
    }
}

// ============================================================================
// Fetcher adapters
// ============================================================================

/// Macro wiring one client fetch method to a [`CollectionFetcher`]
macro_rules! define_fetcher {
    ($name:ident, $item:ty, $doc:literal, |$client:ident| $body:expr) => {
        #[doc = $doc]
        pub struct $name(pub MagnusClient);

        #[async_trait]
        impl CollectionFetcher<$item> for $name {
            async fn fetch(&self) -> FetchResult<Vec<$item>> {
                let $client = &self.0;
                let items = $body.await.map_err(FetchError::from)?;
                Ok(items)
            }
        }
    };
}

define_fetcher!(
    VendorPaymentsFetcher,
    VendorInvoice,
    "Fetches the approvals dataset",
    |client| async move { client.vendor_payments().await.map(|s| s.invoices) }
);

define_fetcher!(
    LiveQueueFetcher,
    QueueTransaction,
    "Fetches the live dispatch queue",
    |client| async move { client.live_queue().await.map(|s| s.transactions) }
);

define_fetcher!(
    LedgerFetcher,
    JournalEntry,
    "Fetches the recon journal",
    |client| async move { client.ledger_entries().await.map(|s| s.entries) }
);

define_fetcher!(
    RailHealthFetcher,
    RailHealth,
    "Fetches per-rail health readings",
    |client| async move { client.rail_health().await }
);

define_fetcher!(
    InvestigationsFetcher,
    InvestigationCase,
    "Fetches open investigation cases",
    |client| async move { client.investigations().await }
);

define_fetcher!(
    AuditFilingsFetcher,
    AuditFiling,
    "Fetches audit filings",
    |client| async move { client.audit_filings().await }
);
