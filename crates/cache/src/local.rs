//! In-process cache of derived views backed by DashMap for lock-free reads.
//! Keys combine a view name with the content fingerprint of the input table,
//! so equal inputs share a computed view.

use dashmap::DashMap;
use novamart_core::Table;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewKey {
    pub view: &'static str,
    pub fingerprint: u64,
}

impl ViewKey {
    pub fn new(view: &'static str, input: &Table) -> Self {
        Self {
            view,
            fingerprint: input.fingerprint(),
        }
    }
}

/// Bounded memo table for derived views.
pub struct ViewCache {
    store: DashMap<ViewKey, Arc<Table>>,
    max_entries: usize,
}

impl ViewCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            store: DashMap::with_capacity(max_entries),
            max_entries,
        }
    }

    pub fn get(&self, key: &ViewKey) -> Option<Arc<Table>> {
        self.store.get(key).map(|entry| Arc::clone(entry.value()))
    }

    /// Insert a view. When full, the view is not stored.
    pub fn put(&self, key: ViewKey, view: Arc<Table>) {
        if self.store.len() >= self.max_entries && !self.store.contains_key(&key) {
            debug!(view = key.view, "View cache full, skipping insert");
            return;
        }
        self.store.insert(key, view);
    }

    /// Return the cached view for `key`, computing and storing it on a miss.
    pub fn get_or_compute(&self, key: ViewKey, compute: impl FnOnce() -> Table) -> Arc<Table> {
        if let Some(view) = self.get(&key) {
            metrics::counter!("views.hit").increment(1);
            return view;
        }
        metrics::counter!("views.miss").increment(1);
        let view = Arc::new(compute());
        self.put(key, Arc::clone(&view));
        view
    }

    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
