//! In-flight action tracking
//!
//! Every user-triggered asynchronous operation is registered under an
//! [`ActionKey`] while it runs, so views can disable controls and render
//! spinner affordances. The tracker guarantees nothing about the operation
//! itself; pairing of begin/end is enforced by [`ActionGuard`], which
//! releases the key on drop so no exit path can leave a key stuck pending.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Identifier for one in-flight asynchronous operation
///
/// Item-scoped keys render as `"verb-target"` (e.g. `approve-TRC-001`);
/// view-scoped keys are the bare verb (e.g. `bulk-approve`, `clear-data`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ActionKey(String);

impl ActionKey {
    /// Key for an action against one item
    pub fn new(verb: &str, target: impl fmt::Display) -> Self {
        Self(format!("{verb}-{target}"))
    }

    /// Key for an action scoped to the whole view
    pub fn global(verb: &str) -> Self {
        Self(verb.to_string())
    }

    /// Borrow the rendered key
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of actions currently in flight
///
/// Cheap to clone; clones share the same underlying set.
#[derive(Clone, Default)]
pub struct ActionTracker {
    in_flight: Arc<DashMap<ActionKey, ()>>,
}

impl ActionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an action as in flight. Idempotent if already present.
    pub fn begin(&self, key: ActionKey) {
        self.in_flight.insert(key, ());
    }

    /// Mark an action as settled. No-op if absent.
    pub fn end(&self, key: &ActionKey) {
        self.in_flight.remove(key);
    }

    /// Whether the action is still in flight
    pub fn is_pending(&self, key: &ActionKey) -> bool {
        self.in_flight.contains_key(key)
    }

    /// Number of actions currently in flight
    pub fn pending_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Register an action and return a guard that settles it on drop
    ///
    /// The guard is the only sanctioned way to pair `begin` with `end`:
    /// success, business failure and early return all release the key.
    pub fn track(&self, key: ActionKey) -> ActionGuard {
        self.begin(key.clone());
        ActionGuard {
            tracker: self.clone(),
            key,
        }
    }
}

/// RAII handle for one tracked action
pub struct ActionGuard {
    tracker: ActionTracker,
    key: ActionKey,
}

impl ActionGuard {
    /// The key this guard settles
    pub fn key(&self) -> &ActionKey {
        &self.key
    }
}

impl Drop for ActionGuard {
    fn drop(&mut self) {
        self.tracker.end(&self.key);
    }
}
