//! Accumulator store implementation
//!
//! Ordered, identity-deduplicated item collection shared between the paging
//! path (the only writer) and any number of readers.

use crate::types::Identify;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

/// Ordered set of fetched items
///
/// Cloning the store clones the handle; all clones see the same items.
pub struct AccumulatorStore<T: Identify> {
    inner: Arc<RwLock<StoreInner<T>>>,
}

struct StoreInner<T: Identify> {
    /// Items in arrival order; readers hold their own `Arc` snapshot
    items: Arc<Vec<T>>,
    /// Identity keys of everything in `items`
    keys: HashSet<T::Key>,
    /// Incremented on every mutation
    revision: u64,
}

impl<T: Identify + Clone> AccumulatorStore<T> {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(StoreInner {
                items: Arc::new(Vec::new()),
                keys: HashSet::new(),
                revision: 0,
            })),
        }
    }

    /// Append items whose identity is not already present
    ///
    /// Existing items keep their position. Duplicates within `items` are
    /// skipped after their first occurrence.
    pub fn append(&self, items: impl IntoIterator<Item = T>) {
        let mut inner = self.write();
        let StoreInner {
            items: stored,
            keys,
            revision,
        } = &mut *inner;

        let before = stored.len();
        let mut skipped = 0usize;
        // Clones the vector only if a reader still holds the previous snapshot
        let stored = Arc::make_mut(stored);
        for item in items {
            if keys.insert(item.id()) {
                stored.push(item);
            } else {
                skipped += 1;
            }
        }

        let added = stored.len() - before;
        if added > 0 {
            *revision += 1;
        }
        debug!(added, skipped, total = stored.len(), "appended items");
    }

    /// Remove every item
    pub fn clear(&self) {
        let mut inner = self.write();
        inner.items = Arc::new(Vec::new());
        inner.keys.clear();
        inner.revision += 1;
        debug!("store cleared");
    }
}

impl<T: Identify> AccumulatorStore<T> {
    /// Snapshot of all items in arrival order
    pub fn all(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.read().items)
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.read().items.len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.read().items.is_empty()
    }

    /// Check if an item with this identity is present
    pub fn contains(&self, key: &T::Key) -> bool {
        self.read().keys.contains(key)
    }

    /// Mutation counter, for cache invalidation
    pub fn revision(&self) -> u64 {
        self.read().revision
    }

    /// Snapshot together with the revision it belongs to
    pub(crate) fn snapshot(&self) -> (Arc<Vec<T>>, u64) {
        let inner = self.read();
        (Arc::clone(&inner.items), inner.revision)
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreInner<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreInner<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Identify + Clone> Default for AccumulatorStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identify> Clone for AccumulatorStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Identify> std::fmt::Debug for AccumulatorStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.read();
        f.debug_struct("AccumulatorStore")
            .field("len", &inner.items.len())
            .field("revision", &inner.revision)
            .finish()
    }
}
