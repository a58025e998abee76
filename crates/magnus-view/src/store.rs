//! Remote collection store
//!
//! Each dashboard view owns one [`RemoteCollectionStore`] per dataset it
//! renders. The store mirrors the backend collection locally, refreshing on
//! demand and on a fixed interval, and keeps the last-known-good snapshot
//! when a refresh fails so a background poll can never blank the view.
//!
//! Overlapping refreshes are sequenced with monotonically increasing
//! tickets: a completion older than the last applied one is discarded, so a
//! slow stale response cannot overwrite fresher data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

/// Poll interval for high-churn queues
pub const LIVE_QUEUE_POLL: Duration = Duration::from_secs(10);
/// Poll interval for moderately changing views
pub const DEFAULT_POLL: Duration = Duration::from_secs(30);
/// Poll interval for slow-changing ledgers and audit filings
pub const LEDGER_POLL: Duration = Duration::from_secs(60);

/// Errors a fetch collaborator can surface
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The call itself failed (network error, non-2xx)
    #[error("transport failure: {0}")]
    Transport(String),

    /// The response arrived but could not be interpreted
    #[error("malformed snapshot: {0}")]
    Decode(String),
}

/// Result type for fetch collaborators
pub type FetchResult<T> = Result<T, FetchError>;

/// External fetch collaborator for one dataset
///
/// Resolves with the current collection snapshot; no backend side effects.
#[async_trait]
pub trait CollectionFetcher<T>: Send + Sync {
    async fn fetch(&self) -> FetchResult<Vec<T>>;
}

/// Lifecycle of the mirrored collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionStatus {
    /// Created, no refresh issued yet
    Idle,
    /// A refresh is in flight
    Loading,
    /// Last applied refresh succeeded
    Loaded,
    /// Last applied refresh failed; items may still hold stale data
    Error,
}

/// Locally mirrored snapshot of one remote dataset
#[derive(Debug, Clone)]
pub struct RemoteCollection<T> {
    /// Last successfully fetched items; `None` until the first success
    pub items: Option<Vec<T>>,
    /// Current lifecycle status
    pub status: CollectionStatus,
    /// Message from the most recent failure, if any
    pub last_error: Option<String>,
    /// When items were last successfully replaced
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl<T> Default for RemoteCollection<T> {
    fn default() -> Self {
        Self {
            items: None,
            status: CollectionStatus::Idle,
            last_error: None,
            last_fetched_at: None,
        }
    }
}

struct StoreState<T> {
    collection: RemoteCollection<T>,
    // Ticket of the most recently applied completion
    last_applied: u64,
}

/// Owner of one remote dataset: refresh policy, last-known-good value,
/// error isolation
pub struct RemoteCollectionStore<T> {
    name: &'static str,
    fetcher: Arc<dyn CollectionFetcher<T>>,
    state: RwLock<StoreState<T>>,
    tickets: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> RemoteCollectionStore<T> {
    /// Create an idle store for a named dataset
    pub fn new(name: &'static str, fetcher: Arc<dyn CollectionFetcher<T>>) -> Self {
        Self {
            name,
            fetcher,
            state: RwLock::new(StoreState {
                collection: RemoteCollection::default(),
                last_applied: 0,
            }),
            tickets: AtomicU64::new(0),
        }
    }

    /// Issue the initial refresh
    pub async fn hydrate(&self) {
        self.refresh().await;
    }

    /// Fetch the collection and apply the result
    ///
    /// Never returns an error: failures are captured into the collection
    /// state (`status`, `last_error`) and prior items are retained.
    pub async fn refresh(&self) {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().collection.status = CollectionStatus::Loading;

        let result = self.fetcher.fetch().await;

        let mut state = self.state.write();
        if ticket <= state.last_applied {
            warn!(
                dataset = self.name,
                ticket,
                applied = state.last_applied,
                "discarding stale refresh completion"
            );
            return;
        }
        state.last_applied = ticket;

        match result {
            Ok(items) => {
                debug!(dataset = self.name, count = items.len(), "refresh applied");
                state.collection.items = Some(items);
                state.collection.status = CollectionStatus::Loaded;
                state.collection.last_error = None;
                state.collection.last_fetched_at = Some(Utc::now());
            }
            Err(err) => {
                warn!(dataset = self.name, error = %err, "refresh failed, keeping stale items");
                state.collection.status = CollectionStatus::Error;
                state.collection.last_error = Some(err.to_string());
            }
        }
    }

    /// Start refreshing on a fixed interval
    ///
    /// The returned handle owns the poll: dropping it (or calling
    /// [`PollHandle::stop`]) cancels the background task. The first
    /// immediate tick is skipped; callers hydrate explicitly.
    pub fn start_polling(self: &Arc<Self>, period: Duration) -> PollHandle {
        let store = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                store.refresh().await;
            }
        });
        PollHandle { task }
    }

    /// Clone the current collection state for rendering
    pub fn snapshot(&self) -> RemoteCollection<T> {
        self.state.read().collection.clone()
    }

    /// Clone the current items, if any refresh has succeeded
    pub fn items(&self) -> Option<Vec<T>> {
        self.state.read().collection.items.clone()
    }

    /// Current lifecycle status
    pub fn status(&self) -> CollectionStatus {
        self.state.read().collection.status
    }

    /// Dataset name this store mirrors
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Owned handle for a running interval poll
pub struct PollHandle {
    task: JoinHandle<()>,
}

impl PollHandle {
    /// Stop the poll, consuming the handle
    pub fn stop(self) {
        self.task.abort();
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Fetcher that replays scripted (delay, result) completions
    struct ScriptedFetcher {
        script: Mutex<VecDeque<(Duration, FetchResult<Vec<&'static str>>)>>,
        calls: AtomicU64,
    }

    impl ScriptedFetcher {
        fn new(script: Vec<(Duration, FetchResult<Vec<&'static str>>)>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into()),
                calls: AtomicU64::new(0),
            })
        }

        fn calls(&self) -> u64 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CollectionFetcher<&'static str> for ScriptedFetcher {
        async fn fetch(&self) -> FetchResult<Vec<&'static str>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (delay, result) = self
                .script
                .lock()
                .pop_front()
                .unwrap_or((Duration::ZERO, Ok(vec![])));
            tokio::time::sleep(delay).await;
            result
        }
    }

    #[tokio::test]
    async fn hydrate_loads_items() {
        let fetcher: Arc<dyn CollectionFetcher<&'static str>> =
            ScriptedFetcher::new(vec![(Duration::ZERO, Ok(vec!["a", "b"]))]);
        let store = RemoteCollectionStore::new("test", fetcher);

        assert_eq!(store.status(), CollectionStatus::Idle);
        store.hydrate().await;

        assert_eq!(store.status(), CollectionStatus::Loaded);
        assert_eq!(store.items().unwrap(), vec!["a", "b"]);
        assert!(store.snapshot().last_fetched_at.is_some());
    }

    #[tokio::test]
    async fn failed_refresh_keeps_stale_items() {
        let fetcher: Arc<dyn CollectionFetcher<&'static str>> = ScriptedFetcher::new(vec![
            (Duration::ZERO, Ok(vec!["a", "b", "c"])),
            (
                Duration::ZERO,
                Err(FetchError::Transport("connection refused".to_string())),
            ),
        ]);
        let store = RemoteCollectionStore::new("test", fetcher);

        store.hydrate().await;
        store.refresh().await;

        let snapshot = store.snapshot();
        assert_eq!(snapshot.status, CollectionStatus::Error);
        assert_eq!(snapshot.items.unwrap(), vec!["a", "b", "c"]);
        assert!(snapshot.last_error.unwrap().contains("connection refused"));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_completion_is_discarded() {
        // First refresh resolves at t=12s with the older snapshot; a second
        // refresh started at t=10s resolves at t=11s with the newer one.
        let fetcher: Arc<dyn CollectionFetcher<&'static str>> = ScriptedFetcher::new(vec![
            (Duration::from_secs(12), Ok(vec!["stale"])),
            (Duration::from_secs(1), Ok(vec!["fresh"])),
        ]);
        let store = Arc::new(RemoteCollectionStore::new("test", fetcher));

        let slow = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(10)).await;

        let fast = tokio::spawn({
            let store = Arc::clone(&store);
            async move { store.refresh().await }
        });
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        tokio::time::advance(Duration::from_secs(1)).await;

        fast.await.unwrap();
        slow.await.unwrap();

        assert_eq!(store.items().unwrap(), vec!["fresh"]);
        assert_eq!(store.status(), CollectionStatus::Loaded);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_poll_handle_cancels_the_task() {
        let fetcher = ScriptedFetcher::new(vec![]);
        let dyn_fetcher: Arc<dyn CollectionFetcher<&'static str>> = fetcher.clone();
        let store = Arc::new(RemoteCollectionStore::new("test", dyn_fetcher));

        let handle = store.start_polling(Duration::from_secs(10));
        tokio::task::yield_now().await;
        // Delay behavior yields one tick per interval, so step the clock
        for _ in 0..2 {
            tokio::time::advance(Duration::from_secs(10)).await;
            tokio::task::yield_now().await;
        }
        let polled = fetcher.calls();
        assert!(polled >= 2, "expected at least two interval polls, got {polled}");

        drop(handle);
        tokio::task::yield_now().await;
        tokio::time::advance(Duration::from_secs(60)).await;
        tokio::task::yield_now().await;
        assert_eq!(fetcher.calls(), polled);
    }
}
