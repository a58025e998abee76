//! View projection: deduplication, filtering, pagination
//!
//! [`project`] is the pure half of every dashboard: it turns the store's
//! current items plus user-controlled filter state into the visible page.
//! It has no side effects and is safe to call on every render.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};

/// Sentinel facet value meaning "no filtering on this dimension"
pub const ALL_SENTINEL: &str = "all";

/// Default rows per page (the audit table constant)
pub const DEFAULT_PAGE_SIZE: usize = 8;

/// Row type that can be projected into a dashboard table
pub trait Projectable {
    /// Key identifying the logical entity; rows sharing a key are
    /// duplicates and only the first occurrence is kept
    fn logical_key(&self) -> String;

    /// Fields the free-text query matches against
    fn search_haystack(&self) -> Vec<String>;

    /// Value of a named exact-match dimension (status/urgency/rail)
    fn facet(&self, name: &str) -> Option<String>;

    /// Timestamp used by date-range filters
    fn occurred_at(&self) -> Option<DateTime<Utc>> {
        None
    }
}

/// User-controlled filter state for one view
///
/// Pure function of user input; changing it has no network effect.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    /// Free-text query, matched case-insensitively
    pub query: String,
    /// Exact-match dimensions; `"all"` disables a dimension
    pub facets: BTreeMap<String, String>,
    /// Lower bound on the row timestamp (inclusive)
    pub since: Option<DateTime<Utc>>,
    /// Upper bound on the row timestamp (inclusive)
    pub until: Option<DateTime<Utc>>,
}

impl FilterState {
    /// No filtering at all
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an exact-match dimension
    pub fn set_facet(&mut self, name: &str, value: &str) {
        self.facets.insert(name.to_string(), value.to_string());
    }

    /// Reset every dimension
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether a row passes every active dimension (logical AND)
    pub fn matches<T: Projectable>(&self, row: &T) -> bool {
        if !self.query.is_empty() {
            let needle = self.query.to_lowercase();
            let hit = row
                .search_haystack()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        for (name, wanted) in &self.facets {
            if wanted == ALL_SENTINEL {
                continue;
            }
            match row.facet(name) {
                Some(actual) if actual.eq_ignore_ascii_case(wanted) => {}
                _ => return false,
            }
        }

        if self.since.is_some() || self.until.is_some() {
            // Rows without a timestamp cannot satisfy an active date range
            let Some(at) = row.occurred_at() else {
                return false;
            };
            if self.since.is_some_and(|since| at < since) {
                return false;
            }
            if self.until.is_some_and(|until| at > until) {
                return false;
            }
        }

        true
    }
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Requested page, clamped into range by [`project`]
    pub page: usize,
    /// Rows per page
    pub page_size: usize,
}

impl PageWindow {
    /// First page with the given size
    pub fn first(page_size: usize) -> Self {
        Self { page: 1, page_size }
    }
}

impl Default for PageWindow {
    fn default() -> Self {
        Self::first(DEFAULT_PAGE_SIZE)
    }
}

/// The visible slice of a projected collection
#[derive(Debug, Clone, PartialEq)]
pub struct Projection<T> {
    /// Rows on the requested (clamped) page
    pub rows: Vec<T>,
    /// Filtered row count across all pages
    pub total: usize,
    /// The page actually served after clamping
    pub page: usize,
    /// Number of pages, at least 1
    pub page_count: usize,
}

/// Deduplicate, filter and paginate a collection
///
/// Requesting a page outside `[1, page_count]` clamps instead of erroring.
pub fn project<T>(items: &[T], filters: &FilterState, window: PageWindow) -> Projection<T>
where
    T: Projectable + Clone,
{
    let filtered = filter_rows(items, filters);

    let total = filtered.len();
    let page_size = window.page_size.max(1);
    let page_count = total.div_ceil(page_size).max(1);
    let page = window.page.clamp(1, page_count);

    let start = (page - 1) * page_size;
    let rows = filtered
        .into_iter()
        .skip(start)
        .take(page_size)
        .cloned()
        .collect();

    Projection {
        rows,
        total,
        page,
        page_count,
    }
}

/// Logical keys of every row in the filtered view (all pages)
///
/// Used by the controller to prune the selection set.
pub fn filtered_keys<T>(items: &[T], filters: &FilterState) -> Vec<String>
where
    T: Projectable,
{
    filter_rows(items, filters)
        .into_iter()
        .map(|row| row.logical_key())
        .collect()
}

fn filter_rows<'a, T>(items: &'a [T], filters: &FilterState) -> Vec<&'a T>
where
    T: Projectable,
{
    let mut seen = HashSet::new();
    items
        .iter()
        .filter(|row| seen.insert(row.logical_key()))
        .filter(|row| filters.matches(*row))
        .collect()
}
