//! Storage port and the explainability query history
//!
//! The history log is durable client-side state: writes are best-effort and
//! never block rendering, and a corrupted persisted log is discarded at
//! load instead of crashing the view. The in-memory copy stays
//! authoritative for the session either way.

use chrono::{DateTime, Utc};
use magnus_types::QueryId;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Key the query history is persisted under
pub const QUERY_HISTORY_KEY: &str = "rca_query_history";

/// Maximum retained queries; older entries are dropped
pub const QUERY_HISTORY_CAP: usize = 50;

/// Storage errors
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The backing store refused the write (e.g. quota exceeded)
    #[error("storage quota exceeded")]
    QuotaExceeded,

    /// The backing store is unavailable
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage writes
pub type StorageResult<T> = Result<T, StorageError>;

/// Durable client-side key-value storage
///
/// Injected into views so tests can swap in an in-memory or failing
/// implementation.
pub trait StoragePort: Send + Sync {
    /// Read a value; `None` when absent
    fn get(&self, key: &str) -> Option<String>;

    /// Write a value
    fn set(&self, key: &str, value: String) -> StorageResult<()>;

    /// Delete a value; no-op when absent
    fn remove(&self, key: &str);
}

/// In-memory storage implementation
#[derive(Default)]
pub struct MemoryStorage {
    map: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl StoragePort for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.map.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) -> StorageResult<()> {
        self.map.write().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.map.write().remove(key);
    }
}

/// One recorded explainability query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    /// Local identifier for the entry
    pub id: QueryId,
    /// The question the operator asked
    pub query: String,
    /// When it was asked
    pub asked_at: DateTime<Utc>,
}

/// Recent-queries log for the explainability view, newest first
pub struct QueryHistory {
    storage: Arc<dyn StoragePort>,
    entries: RwLock<Vec<QueryRecord>>,
}

impl QueryHistory {
    /// Load the history from storage
    ///
    /// Malformed persisted content is removed and the log starts empty.
    pub fn load(storage: Arc<dyn StoragePort>) -> Self {
        let entries = match storage.get(QUERY_HISTORY_KEY) {
            Some(raw) => match serde_json::from_str::<Vec<QueryRecord>>(&raw) {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(error = %err, "discarding corrupted query history");
                    storage.remove(QUERY_HISTORY_KEY);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        Self {
            storage,
            entries: RwLock::new(entries),
        }
    }

    /// Record a query at the head of the log, dropping entries past the cap
    ///
    /// Persistence is best-effort: a failed write is logged and the
    /// in-memory log keeps the entry.
    pub fn record(&self, query: &str) -> QueryRecord {
        let record = QueryRecord {
            id: QueryId::new(),
            query: query.to_string(),
            asked_at: Utc::now(),
        };

        let snapshot = {
            let mut entries = self.entries.write();
            entries.insert(0, record.clone());
            entries.truncate(QUERY_HISTORY_CAP);
            entries.clone()
        };
        self.persist(&snapshot);
        record
    }

    /// Current entries, newest first
    pub fn entries(&self) -> Vec<QueryRecord> {
        self.entries.read().clone()
    }

    /// Forget everything, in memory and in storage
    pub fn clear(&self) {
        self.entries.write().clear();
        self.storage.remove(QUERY_HISTORY_KEY);
    }

    fn persist(&self, entries: &[QueryRecord]) {
        match serde_json::to_string(entries) {
            Ok(raw) => {
                if let Err(err) = self.storage.set(QUERY_HISTORY_KEY, raw) {
                    warn!(error = %err, "query history write failed, keeping in-memory log");
                }
            }
            Err(err) => warn!(error = %err, "query history serialization failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Storage that accepts reads but refuses all writes
    struct ReadOnlyStorage {
        inner: MemoryStorage,
    }

    impl StoragePort for ReadOnlyStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.inner.get(key)
        }

        fn set(&self, _key: &str, _value: String) -> StorageResult<()> {
            Err(StorageError::QuotaExceeded)
        }

        fn remove(&self, key: &str) {
            self.inner.remove(key);
        }
    }

    #[test]
    fn round_trips_through_storage() {
        let storage = Arc::new(MemoryStorage::new());

        let history = QueryHistory::load(Arc::clone(&storage) as Arc<dyn StoragePort>);
        history.record("why did TRC-001 fail?");
        history.record("which rail handled INV-9?");

        let reloaded = QueryHistory::load(storage as Arc<dyn StoragePort>);
        let entries = reloaded.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].query, "which rail handled INV-9?");
    }

    #[test]
    fn corrupted_history_is_discarded() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(QUERY_HISTORY_KEY, "{not json".to_string())
            .unwrap();

        let history = QueryHistory::load(Arc::clone(&storage) as Arc<dyn StoragePort>);
        assert!(history.entries().is_empty());
        assert!(storage.get(QUERY_HISTORY_KEY).is_none());
    }

    #[test]
    fn caps_at_fifty_entries() {
        let storage: Arc<dyn StoragePort> = Arc::new(MemoryStorage::new());
        let history = QueryHistory::load(storage);

        for i in 0..60 {
            history.record(&format!("query {i}"));
        }

        let entries = history.entries();
        assert_eq!(entries.len(), QUERY_HISTORY_CAP);
        assert_eq!(entries[0].query, "query 59");
        assert_eq!(entries.last().unwrap().query, "query 10");
    }

    #[test]
    fn failed_write_keeps_in_memory_log() {
        let storage: Arc<dyn StoragePort> = Arc::new(ReadOnlyStorage {
            inner: MemoryStorage::new(),
        });
        let history = QueryHistory::load(storage);

        history.record("does not persist");
        assert_eq!(history.entries().len(), 1);
    }

    #[test]
    fn clear_removes_persisted_state() {
        let storage = Arc::new(MemoryStorage::new());
        let history = QueryHistory::load(Arc::clone(&storage) as Arc<dyn StoragePort>);

        history.record("q");
        assert!(storage.get(QUERY_HISTORY_KEY).is_some());

        history.clear();
        assert!(history.entries().is_empty());
        assert!(storage.get(QUERY_HISTORY_KEY).is_none());
    }
}
