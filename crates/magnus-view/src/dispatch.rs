//! Mutation dispatch
//!
//! Routes user-triggered mutations (approve/reject/retry/cancel/bulk/
//! download) through the action tracker, refreshes the owning store on
//! success, and downgrades every failure to a user-visible notification.
//! Nothing escapes as an unhandled error: transport failures and business
//! rejections both end up on the notification channel with collection
//! state untouched.

use crate::select::SelectionSet;
use crate::store::RemoteCollectionStore;
use crate::tracker::{ActionKey, ActionTracker};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use tracing::debug;

/// Envelope returned by mutation collaborators
///
/// Expected business failures come back as `success: false`; the
/// collaborator only errors for transport failures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// Whether the backend accepted the mutation
    pub success: bool,
    /// Operator-facing message
    pub message: String,
    /// Optional structured payload (details views)
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// File payload returned by download collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadPayload {
    /// File body as text (CSV, XML)
    pub content: String,
    /// MIME type for the client-initiated save
    pub content_type: String,
    /// Suggested filename
    pub filename: String,
}

impl DownloadPayload {
    /// Byte blob for the client-initiated file save
    pub fn into_bytes(self) -> Vec<u8> {
        self.content.into_bytes()
    }
}

/// Envelope returned by download collaborators
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadOutcome {
    /// Whether the pack was produced
    pub success: bool,
    /// Operator-facing message on failure
    #[serde(default)]
    pub message: Option<String>,
    /// The payload when `success` is true
    #[serde(default)]
    pub data: Option<DownloadPayload>,
}

/// Severity of a user-visible notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationSeverity {
    Info,
    Error,
}

/// One user-visible message tied to an attempted action
#[derive(Debug, Clone)]
pub struct Notification {
    /// The action the message is about
    pub key: ActionKey,
    /// Message shown inline, naming the attempted action
    pub message: String,
    /// Rendering severity
    pub severity: NotificationSeverity,
}

impl Notification {
    fn info(key: ActionKey, message: String) -> Self {
        Self {
            key,
            message,
            severity: NotificationSeverity::Info,
        }
    }

    fn failure(key: ActionKey, message: String) -> Self {
        Self {
            key,
            message,
            severity: NotificationSeverity::Error,
        }
    }
}

/// User-visible error channel for one view
///
/// Clones share the same channel; each subscriber gets its own receiver.
#[derive(Clone)]
pub struct Notifier {
    tx: flume::Sender<Notification>,
    rx: flume::Receiver<Notification>,
}

impl Notifier {
    /// Create an unbounded notification channel
    pub fn new() -> Self {
        let (tx, rx) = flume::unbounded();
        Self { tx, rx }
    }

    /// Publish a notification; dropped if nobody listens
    pub fn publish(&self, notification: Notification) {
        let _ = self.tx.try_send(notification);
    }

    /// Subscribe to notifications
    pub fn subscribe(&self) -> flume::Receiver<Notification> {
        self.rx.clone()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Issues named mutations against the backend and reconciles the view
pub struct MutationDispatcher<T> {
    tracker: ActionTracker,
    store: Arc<RemoteCollectionStore<T>>,
    selection: SelectionSet,
    notifier: Notifier,
}

impl<T: Clone + Send + Sync + 'static> MutationDispatcher<T> {
    /// Wire a dispatcher to the view's tracker, store and selection
    pub fn new(
        tracker: ActionTracker,
        store: Arc<RemoteCollectionStore<T>>,
        selection: SelectionSet,
        notifier: Notifier,
    ) -> Self {
        Self {
            tracker,
            store,
            selection,
            notifier,
        }
    }

    /// Issue one mutation against a single target
    ///
    /// On success the store is refreshed and the target leaves the
    /// selection. On business failure or transport error a notification is
    /// published and collection state is left unchanged. The action key is
    /// pending for exactly the lifetime of the call.
    pub async fn invoke<E, Fut>(&self, key: ActionKey, target: Option<&str>, op: Fut) -> bool
    where
        Fut: Future<Output = Result<MutationOutcome, E>>,
        E: fmt::Display,
    {
        let _guard = self.tracker.track(key.clone());
        match op.await {
            Ok(outcome) if outcome.success => {
                debug!(action = %key, "mutation accepted, refreshing");
                self.store.refresh().await;
                if let Some(id) = target {
                    self.selection.remove(id);
                }
                self.notifier.publish(Notification::info(key, outcome.message));
                true
            }
            Ok(outcome) => {
                self.notifier
                    .publish(Notification::failure(key, outcome.message));
                false
            }
            Err(err) => {
                self.notifier
                    .publish(Notification::failure(key, err.to_string()));
                false
            }
        }
    }

    /// Issue one combined mutation for a set of targets
    ///
    /// The caller builds `op` as a single backend call carrying all
    /// identifiers. On success the entire selection is cleared; on failure
    /// it is left untouched.
    pub async fn invoke_bulk<E, Fut>(&self, key: ActionKey, op: Fut) -> bool
    where
        Fut: Future<Output = Result<MutationOutcome, E>>,
        E: fmt::Display,
    {
        let _guard = self.tracker.track(key.clone());
        match op.await {
            Ok(outcome) if outcome.success => {
                debug!(action = %key, "bulk mutation accepted, refreshing");
                self.store.refresh().await;
                self.selection.clear();
                self.notifier.publish(Notification::info(key, outcome.message));
                true
            }
            Ok(outcome) => {
                self.notifier
                    .publish(Notification::failure(key, outcome.message));
                false
            }
            Err(err) => {
                self.notifier
                    .publish(Notification::failure(key, err.to_string()));
                false
            }
        }
    }

    /// Fetch a file payload for a client-initiated save
    ///
    /// No collection mutation occurs; failures are notified like any other
    /// action.
    pub async fn invoke_download<E, Fut>(&self, key: ActionKey, op: Fut) -> Option<DownloadPayload>
    where
        Fut: Future<Output = Result<DownloadOutcome, E>>,
        E: fmt::Display,
    {
        let _guard = self.tracker.track(key.clone());
        match op.await {
            Ok(outcome) if outcome.success => match outcome.data {
                Some(payload) => Some(payload),
                None => {
                    self.notifier.publish(Notification::failure(
                        key,
                        "download succeeded but carried no payload".to_string(),
                    ));
                    None
                }
            },
            Ok(outcome) => {
                let message = outcome
                    .message
                    .unwrap_or_else(|| "download rejected".to_string());
                self.notifier.publish(Notification::failure(key, message));
                None
            }
            Err(err) => {
                self.notifier
                    .publish(Notification::failure(key, err.to_string()));
                None
            }
        }
    }

    /// Tracker shared with the owning view
    pub fn tracker(&self) -> &ActionTracker {
        &self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CollectionFetcher, FetchResult};
    use async_trait::async_trait;

    struct EmptyFetcher;

    #[async_trait]
    impl CollectionFetcher<&'static str> for EmptyFetcher {
        async fn fetch(&self) -> FetchResult<Vec<&'static str>> {
            Ok(vec![])
        }
    }

    fn dispatcher() -> (MutationDispatcher<&'static str>, Notifier, SelectionSet) {
        let tracker = ActionTracker::new();
        let fetcher: Arc<dyn CollectionFetcher<&'static str>> = Arc::new(EmptyFetcher);
        let store = Arc::new(RemoteCollectionStore::new("test", fetcher));
        let selection = SelectionSet::new();
        let notifier = Notifier::new();
        let dispatcher =
            MutationDispatcher::new(tracker, store, selection.clone(), notifier.clone());
        (dispatcher, notifier, selection)
    }

    fn accepted() -> Result<MutationOutcome, String> {
        Ok(MutationOutcome {
            success: true,
            message: "done".to_string(),
            data: None,
        })
    }

    fn rejected() -> Result<MutationOutcome, String> {
        Ok(MutationOutcome {
            success: false,
            message: "limit breached".to_string(),
            data: None,
        })
    }

    #[tokio::test]
    async fn key_settles_on_every_outcome() {
        let (dispatcher, _notifier, _selection) = dispatcher();
        let key = ActionKey::new("approve", "INV-1");

        assert!(dispatcher.invoke(key.clone(), None, async { accepted() }).await);
        assert!(!dispatcher.tracker().is_pending(&key));

        assert!(!dispatcher.invoke(key.clone(), None, async { rejected() }).await);
        assert!(!dispatcher.tracker().is_pending(&key));

        let transport: Result<MutationOutcome, String> = Err("timeout".to_string());
        assert!(!dispatcher.invoke(key.clone(), None, async { transport }).await);
        assert!(!dispatcher.tracker().is_pending(&key));
    }

    #[tokio::test]
    async fn success_removes_target_from_selection() {
        let (dispatcher, _notifier, selection) = dispatcher();
        selection.toggle("INV-1");
        selection.toggle("INV-2");

        let key = ActionKey::new("approve", "INV-1");
        dispatcher.invoke(key, Some("INV-1"), async { accepted() }).await;

        assert!(!selection.contains("INV-1"));
        assert!(selection.contains("INV-2"));
    }

    #[tokio::test]
    async fn bulk_clears_selection_only_on_success() {
        let (dispatcher, _notifier, selection) = dispatcher();
        selection.toggle("INV-1");
        selection.toggle("INV-2");

        let key = ActionKey::global("bulk-approve");
        dispatcher.invoke_bulk(key.clone(), async { rejected() }).await;
        assert_eq!(selection.len(), 2);

        dispatcher.invoke_bulk(key, async { accepted() }).await;
        assert!(selection.is_empty());
    }

    #[tokio::test]
    async fn failures_reach_the_notification_channel() {
        let (dispatcher, notifier, _selection) = dispatcher();
        let rx = notifier.subscribe();

        let key = ActionKey::new("reject", "INV-9");
        dispatcher.invoke(key.clone(), None, async { rejected() }).await;

        let notification = rx.try_recv().unwrap();
        assert_eq!(notification.key, key);
        assert_eq!(notification.severity, NotificationSeverity::Error);
        assert_eq!(notification.message, "limit breached");
    }

    #[tokio::test]
    async fn download_returns_payload_without_touching_selection() {
        let (dispatcher, _notifier, selection) = dispatcher();
        selection.toggle("J-1");

        let key = ActionKey::new("download", "J-1");
        let outcome: Result<DownloadOutcome, String> = Ok(DownloadOutcome {
            success: true,
            message: None,
            data: Some(DownloadPayload {
                content: "journal_id,amount\nJ-1,100".to_string(),
                content_type: "text/csv".to_string(),
                filename: "J-1.csv".to_string(),
            }),
        });
        let payload = dispatcher.invoke_download(key, async { outcome }).await.unwrap();

        assert_eq!(payload.filename, "J-1.csv");
        assert_eq!(payload.into_bytes(), b"journal_id,amount\nJ-1,100".to_vec());
        assert!(selection.contains("J-1"));
    }
}
