//! Magnus View - Polling data-view controller for the Arealis dashboards
//!
//! Every Magnus dashboard (approvals, audit, investigations, ledger/recon,
//! live queue, rail health) is the same machine: fetch a collection on
//! mount, poll it on an interval, mutate rows through the backend, re-fetch
//! to reconcile, and track per-item in-flight state so controls can
//! disable. This crate is that machine, factored out of the views:
//!
//! - **Action Tracker**: which named operations are in flight, with an
//!   RAII guard so no exit path leaves a key stuck pending
//! - **Remote Collection Store**: one named remote dataset with manual and
//!   interval refresh, last-known-good retention, and sequence guarding
//!   against out-of-order completions
//! - **Mutation Dispatcher**: named mutations (approve/reject/retry/
//!   cancel/bulk/download) that refresh the store on success and downgrade
//!   every failure to a notification
//! - **View projection**: pure dedup/filter/paginate reducer
//! - **Selection Set** and **Storage Port** (query history) support state
//!
//! # Example
//!
//! ```ignore
//! use magnus_view::{DashboardController, ViewPreset};
//!
//! let controller = DashboardController::new(ViewPreset::APPROVALS, fetcher);
//! controller.hydrate().await;
//! controller.start_polling();
//!
//! let page = controller.projection();
//! controller.run_action("approve", "INV-1", api.approve_payment("INV-1")).await;
//! ```
//!
//! Everything here is UI-framework free: the store is an owned resource
//! (polling starts return a handle whose drop cancels the task), so the
//! whole controller is testable under a plain tokio runtime.

pub mod controller;
pub mod dispatch;
pub mod history;
pub mod project;
pub mod select;
pub mod store;
pub mod tracker;
pub mod views;

pub use controller::{DashboardController, ViewPreset};
pub use dispatch::{
    DownloadOutcome, DownloadPayload, MutationDispatcher, MutationOutcome, Notification,
    NotificationSeverity, Notifier,
};
pub use history::{
    MemoryStorage, QueryHistory, QueryRecord, StorageError, StoragePort, StorageResult,
    QUERY_HISTORY_CAP, QUERY_HISTORY_KEY,
};
pub use project::{
    filtered_keys, project, FilterState, PageWindow, Projectable, Projection, ALL_SENTINEL,
    DEFAULT_PAGE_SIZE,
};
pub use select::SelectionSet;
pub use store::{
    CollectionFetcher, CollectionStatus, FetchError, FetchResult, PollHandle, RemoteCollection,
    RemoteCollectionStore, DEFAULT_POLL, LEDGER_POLL, LIVE_QUEUE_POLL,
};
pub use tracker::{ActionGuard, ActionKey, ActionTracker};
