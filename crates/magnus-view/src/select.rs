//! Row selection for bulk operations

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Set of row identifiers checked for bulk operations
///
/// Members must correspond to identifiers currently present in the filtered
/// view; the owning controller calls [`SelectionSet::retain_visible`] after
/// each projection so rows that leave the view (e.g. after approval) drop
/// out of the selection. Clones share the same underlying set.
#[derive(Clone, Default)]
pub struct SelectionSet {
    inner: Arc<RwLock<BTreeSet<String>>>,
}

impl SelectionSet {
    /// Create an empty selection
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle one identifier in or out of the selection
    pub fn toggle(&self, id: &str) {
        let mut set = self.inner.write();
        if !set.remove(id) {
            set.insert(id.to_string());
        }
    }

    /// Replace the selection with the given identifiers
    pub fn select_all<I, S>(&self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = self.inner.write();
        set.clear();
        set.extend(ids.into_iter().map(Into::into));
    }

    /// Remove one identifier
    pub fn remove(&self, id: &str) {
        self.inner.write().remove(id);
    }

    /// Empty the selection
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Drop members no longer present in the filtered view
    pub fn retain_visible(&self, visible: &[String]) {
        self.inner.write().retain(|id| visible.iter().any(|v| v == id));
    }

    /// Membership test
    pub fn contains(&self, id: &str) -> bool {
        self.inner.read().contains(id)
    }

    /// Selected identifiers in sorted order
    pub fn ids(&self) -> Vec<String> {
        self.inner.read().iter().cloned().collect()
    }

    /// Number of selected rows
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Whether nothing is selected
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
