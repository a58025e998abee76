//! Dashboard controller
//!
//! Composes one remote collection store, action tracker, selection set,
//! notifier and filter/page state into the controller each dashboard view
//! owns exclusively. Views never share controllers; teardown drops the
//! poll handle and with it the background refresh task.

use crate::dispatch::{DownloadOutcome, DownloadPayload, MutationDispatcher, MutationOutcome, Notification, Notifier};
use crate::project::{filtered_keys, project, FilterState, PageWindow, Projectable, Projection, DEFAULT_PAGE_SIZE};
use crate::store::{
    CollectionFetcher, CollectionStatus, PollHandle, RemoteCollection, RemoteCollectionStore,
    DEFAULT_POLL, LEDGER_POLL, LIVE_QUEUE_POLL,
};
use crate::select::SelectionSet;
use crate::tracker::{ActionKey, ActionTracker};
use parking_lot::{Mutex, RwLock};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Per-dashboard configuration: dataset name, refresh cadence, page size
#[derive(Debug, Clone, Copy)]
pub struct ViewPreset {
    /// Dataset name used in logs
    pub name: &'static str,
    /// Interval between background refreshes
    pub poll_interval: Duration,
    /// Rows per table page
    pub page_size: usize,
}

impl ViewPreset {
    /// Approvals dashboard
    pub const APPROVALS: Self = Self {
        name: "approvals",
        poll_interval: DEFAULT_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };

    /// Live dispatch queue (high churn)
    pub const LIVE_QUEUE: Self = Self {
        name: "live-queue",
        poll_interval: LIVE_QUEUE_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };

    /// Ledger/recon journal
    pub const LEDGER: Self = Self {
        name: "ledger",
        poll_interval: LEDGER_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };

    /// Audit filings
    pub const AUDIT: Self = Self {
        name: "audit",
        poll_interval: LEDGER_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };

    /// Investigation cases
    pub const INVESTIGATIONS: Self = Self {
        name: "investigations",
        poll_interval: DEFAULT_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };

    /// Rail health readings
    pub const RAIL_HEALTH: Self = Self {
        name: "rail-health",
        poll_interval: DEFAULT_POLL,
        page_size: DEFAULT_PAGE_SIZE,
    };
}

/// One dashboard view's state: store, tracker, selection, filters, paging
pub struct DashboardController<T> {
    preset: ViewPreset,
    store: Arc<RemoteCollectionStore<T>>,
    tracker: ActionTracker,
    selection: SelectionSet,
    notifier: Notifier,
    dispatcher: MutationDispatcher<T>,
    filters: RwLock<FilterState>,
    window: RwLock<PageWindow>,
    poll: Mutex<Option<PollHandle>>,
}

impl<T> DashboardController<T>
where
    T: Projectable + Clone + Send + Sync + 'static,
{
    /// Wire up a controller for one dataset
    pub fn new(preset: ViewPreset, fetcher: Arc<dyn CollectionFetcher<T>>) -> Self {
        let store = Arc::new(RemoteCollectionStore::new(preset.name, fetcher));
        let tracker = ActionTracker::new();
        let selection = SelectionSet::new();
        let notifier = Notifier::new();
        let dispatcher = MutationDispatcher::new(
            tracker.clone(),
            Arc::clone(&store),
            selection.clone(),
            notifier.clone(),
        );
        Self {
            preset,
            store,
            tracker,
            selection,
            notifier,
            dispatcher,
            filters: RwLock::new(FilterState::new()),
            window: RwLock::new(PageWindow::first(preset.page_size)),
            poll: Mutex::new(None),
        }
    }

    /// Issue the initial refresh
    pub async fn hydrate(&self) {
        self.store.hydrate().await;
    }

    /// Start the background poll at the preset cadence
    ///
    /// Replacing an existing poll stops it first.
    pub fn start_polling(&self) {
        let handle = self.store.start_polling(self.preset.poll_interval);
        *self.poll.lock() = Some(handle);
    }

    /// Stop the background poll, if running
    pub fn stop_polling(&self) {
        if let Some(handle) = self.poll.lock().take() {
            handle.stop();
        }
    }

    /// Derive the visible page from current items and filter state
    ///
    /// Also prunes the selection so it only references rows still present
    /// in the filtered view.
    pub fn projection(&self) -> Projection<T> {
        let items = self.store.items().unwrap_or_default();
        let filters = self.filters.read().clone();
        let window = *self.window.read();

        self.selection.retain_visible(&filtered_keys(&items, &filters));
        project(&items, &filters, window)
    }

    /// Set the free-text query and return to the first page
    pub fn set_query(&self, query: &str) {
        self.filters.write().query = query.to_string();
        self.window.write().page = 1;
    }

    /// Set an exact-match filter dimension and return to the first page
    pub fn set_facet(&self, name: &str, value: &str) {
        self.filters.write().set_facet(name, value);
        self.window.write().page = 1;
    }

    /// Request a page; projection clamps it into range
    pub fn set_page(&self, page: usize) {
        self.window.write().page = page;
    }

    /// Move one page forward
    pub fn next_page(&self) {
        self.window.write().page += 1;
    }

    /// Move one page back
    pub fn prev_page(&self) {
        let mut window = self.window.write();
        window.page = window.page.saturating_sub(1).max(1);
    }

    /// Toggle one row in the selection
    pub fn toggle_selected(&self, id: &str) {
        self.selection.toggle(id);
    }

    /// Select every row in the filtered view (all pages)
    pub fn select_all_visible(&self) {
        let items = self.store.items().unwrap_or_default();
        let filters = self.filters.read().clone();
        self.selection.select_all(filtered_keys(&items, &filters));
    }

    /// Run an item-scoped mutation (approve/reject/retry/cancel)
    pub async fn run_action<E, Fut>(&self, verb: &str, id: &str, op: Fut) -> bool
    where
        Fut: Future<Output = Result<MutationOutcome, E>>,
        E: fmt::Display,
    {
        self.dispatcher
            .invoke(ActionKey::new(verb, id), Some(id), op)
            .await
    }

    /// Run a combined mutation for the whole selection
    pub async fn run_bulk<E, Fut>(&self, verb: &str, op: Fut) -> bool
    where
        Fut: Future<Output = Result<MutationOutcome, E>>,
        E: fmt::Display,
    {
        self.dispatcher.invoke_bulk(ActionKey::global(verb), op).await
    }

    /// Fetch a file payload for a client-initiated save
    pub async fn run_download<E, Fut>(&self, verb: &str, id: &str, op: Fut) -> Option<DownloadPayload>
    where
        Fut: Future<Output = Result<DownloadOutcome, E>>,
        E: fmt::Display,
    {
        self.dispatcher
            .invoke_download(ActionKey::new(verb, id), op)
            .await
    }

    /// Reset filters, paging and selection, then refetch
    pub async fn clear_data(&self) {
        let key = ActionKey::global("clear-data");
        let _guard = self.tracker.track(key);

        self.filters.write().reset();
        self.window.write().page = 1;
        self.selection.clear();
        self.store.refresh().await;
    }

    /// Current collection lifecycle status
    pub fn status(&self) -> CollectionStatus {
        self.store.status()
    }

    /// Clone of the full collection state (for degraded indicators)
    pub fn collection(&self) -> RemoteCollection<T> {
        self.store.snapshot()
    }

    /// Subscribe to user-visible notifications
    pub fn notifications(&self) -> flume::Receiver<Notification> {
        self.notifier.subscribe()
    }

    /// Whether a given action is still in flight
    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.tracker.is_pending(key)
    }

    /// The view's selection set
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The view's action tracker
    pub fn tracker(&self) -> &ActionTracker {
        &self.tracker
    }

    /// The preset this controller was built with
    pub fn preset(&self) -> ViewPreset {
        self.preset
    }
}

impl<T> Drop for DashboardController<T> {
    fn drop(&mut self) {
        // PollHandle aborts its task on drop; taking it here just makes
        // teardown explicit.
        self.poll.lock().take();
    }
}
