//! Session-scoped memoization of the loaded table bundle.
//!
//! The first access loads from disk while holding the slot lock, so callers
//! racing on a cold cache wait for that single load instead of reading the
//! files again. The bundle is handed out as a shared `Arc` until
//! [`BundleCache::invalidate`] is called.

use novamart_core::config::DataConfig;
use novamart_core::{DashboardResult, TableBundle};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info};

type LoadFn = dyn Fn() -> DashboardResult<TableBundle> + Send + Sync;

pub struct BundleCache {
    loader: Box<LoadFn>,
    slot: Mutex<Option<Arc<TableBundle>>>,
}

impl BundleCache {
    /// Cache around an arbitrary bundle source.
    pub fn new(loader: impl Fn() -> DashboardResult<TableBundle> + Send + Sync + 'static) -> Self {
        Self {
            loader: Box::new(loader),
            slot: Mutex::new(None),
        }
    }

    /// Cache that loads from the configured data directory.
    pub fn from_config(config: DataConfig) -> Self {
        Self::new(move || novamart_loader::load_all(&config))
    }

    /// The session bundle, loading it on first access.
    ///
    /// A failed load leaves the cache empty so a later call retries.
    pub fn get_or_load(&self) -> DashboardResult<Arc<TableBundle>> {
        let mut slot = self.slot.lock();
        if let Some(bundle) = slot.as_ref() {
            metrics::counter!("bundle_cache.hit").increment(1);
            return Ok(Arc::clone(bundle));
        }

        metrics::counter!("bundle_cache.miss").increment(1);
        debug!("Bundle cache cold, loading");
        let bundle = Arc::new((self.loader)()?);
        *slot = Some(Arc::clone(&bundle));
        Ok(bundle)
    }

    /// Drop the memoized bundle. Returns whether one was held.
    pub fn invalidate(&self) -> bool {
        let dropped = self.slot.lock().take().is_some();
        if dropped {
            info!("Bundle cache invalidated");
        }
        dropped
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use novamart_core::{Column, DashboardError, Table, TableName};
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn bundle() -> TableBundle {
        let tables: BTreeMap<_, _> = TableName::ALL
            .iter()
            .map(|name| {
                (
                    *name,
                    Table::try_new(vec![Column::numbers("x", [1.0])]).unwrap(),
                )
            })
            .collect();
        TableBundle::new(tables).unwrap()
    }

    fn counting_cache() -> (BundleCache, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&loads);
        let cache = BundleCache::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(bundle())
        });
        (cache, loads)
    }

    #[test]
    fn test_repeated_access_returns_same_bundle() {
        let (cache, loads) = counting_cache();
        assert!(!cache.is_loaded());
        let a = cache.get_or_load().unwrap();
        let b = cache.get_or_load().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.is_loaded());
    }

    #[test]
    fn test_invalidate_forces_reload() {
        let (cache, loads) = counting_cache();
        let a = cache.get_or_load().unwrap();
        assert!(cache.invalidate());
        assert!(!cache.invalidate());
        let b = cache.get_or_load().unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_concurrent_first_access_loads_once() {
        let (cache, loads) = counting_cache();
        let bundles: Vec<Arc<TableBundle>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8).map(|_| s.spawn(|| cache.get_or_load().unwrap())).collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(bundles.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let cache = BundleCache::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(DashboardError::FileNotFound {
                    file: "funnel_data.csv".into(),
                })
            } else {
                Ok(bundle())
            }
        });
        assert!(cache.get_or_load().is_err());
        assert!(!cache.is_loaded());
        assert!(cache.get_or_load().is_ok());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
