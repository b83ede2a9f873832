//! Search overlay implementation

use crate::store::AccumulatorStore;
use crate::types::{Identify, Searchable};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// Filtered projection of an [`AccumulatorStore`]
///
/// With an empty query the view is the live store. With a non-empty query it
/// is the subsequence of stored items whose display name contains the query,
/// ignoring case. Setting a query never fetches anything.
pub struct SearchOverlay<T: Identify> {
    store: AccumulatorStore<T>,
    state: Mutex<OverlayState<T>>,
}

struct OverlayState<T> {
    query: String,
    /// Lowercased query, computed once per `set_query`
    needle: String,
    cache: Option<CachedView<T>>,
}

struct CachedView<T> {
    needle: String,
    revision: u64,
    items: Arc<Vec<T>>,
}

impl<T: Identify + Searchable + Clone> SearchOverlay<T> {
    /// Create an overlay over a store with no active query
    pub fn new(store: AccumulatorStore<T>) -> Self {
        Self {
            store,
            state: Mutex::new(OverlayState {
                query: String::new(),
                needle: String::new(),
                cache: None,
            }),
        }
    }

    /// Set the query; an empty string disables filtering
    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        let mut state = self.lock();
        state.needle = query.to_lowercase();
        debug!(query = %query, "search query set");
        state.query = query;
    }

    /// Disable filtering
    pub fn clear_query(&self) {
        self.set_query(String::new());
    }

    /// Current query
    pub fn query(&self) -> String {
        self.lock().query.clone()
    }

    /// Check if a query is active
    pub fn is_active(&self) -> bool {
        !self.lock().query.is_empty()
    }

    /// Items visible under the current query
    pub fn view(&self) -> Arc<Vec<T>> {
        let mut state = self.lock();
        if state.query.is_empty() {
            return self.store.all();
        }

        let (items, revision) = self.store.snapshot();
        if let Some(cache) = &state.cache {
            if cache.revision == revision && cache.needle == state.needle {
                return Arc::clone(&cache.items);
            }
        }

        let filtered: Arc<Vec<T>> = Arc::new(
            items
                .iter()
                .filter(|item| matches_needle(item.display_name(), &state.needle))
                .cloned()
                .collect(),
        );
        debug!(
            query = %state.query,
            matched = filtered.len(),
            total = items.len(),
            "search view recomputed"
        );
        let needle = state.needle.clone();
        state.cache = Some(CachedView {
            needle,
            revision,
            items: Arc::clone(&filtered),
        });
        filtered
    }

    /// Underlying store
    pub fn store(&self) -> &AccumulatorStore<T> {
        &self.store
    }
}

impl<T: Identify> SearchOverlay<T> {
    fn lock(&self) -> MutexGuard<'_, OverlayState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Identify> std::fmt::Debug for SearchOverlay<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchOverlay")
            .field("query", &self.lock().query)
            .field("store", &self.store)
            .finish()
    }
}

/// Case-insensitive substring match against an already lowercased needle
pub fn matches_needle(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}
