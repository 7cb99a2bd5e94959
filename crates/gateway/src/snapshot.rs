//! In-memory catalog snapshot with single-flight refresh.
//!
//! The snapshot is one immutable [`CatalogSnapshot`] behind an `Arc`,
//! replaced wholesale on each successful refresh. Readers always see either
//! the pre-refresh or the post-refresh catalog, never a half-written one.
//! The only serialization primitive is the in-flight flag: at most one
//! refresh executes at a time, no matter how many callers asked for one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::Utc;
use esim_global_core::catalog::{Country, Product};

/// The cached catalog served to clients.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub countries: Vec<Country>,
    /// Wall-clock time of the last successful refresh, formatted
    /// `%Y-%m-%d %H:%M:%S` (UTC). `None` until the first commit.
    pub last_updated: Option<String>,
}

/// Owner of the current [`CatalogSnapshot`] and the single-flight flag.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: RwLock<Arc<CatalogSnapshot>>,
    refreshing: AtomicBool,
}

impl SnapshotStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Non-blocking read of the current snapshot.
    #[must_use]
    pub fn get(&self) -> Arc<CatalogSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Try to start a refresh.
    ///
    /// Returns `None` when a refresh is already in flight; the caller must
    /// then return without side effect. The returned guard releases the
    /// flag on drop, so every exit path of a refresh - success, upstream
    /// failure, early return - clears it.
    #[must_use]
    pub fn begin_refresh(&self) -> Option<RefreshGuard<'_>> {
        self.refreshing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then_some(RefreshGuard { store: self })
    }

    /// Whether a refresh is currently in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::SeqCst)
    }

    /// Replace the whole snapshot: products, countries and timestamp swap
    /// together as one `Arc`.
    pub fn commit(&self, products: Vec<Product>, countries: Vec<Country>) {
        let snapshot = Arc::new(CatalogSnapshot {
            products,
            countries,
            last_updated: Some(now_stamp()),
        });
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }
}

/// Releases the single-flight flag when dropped.
#[derive(Debug)]
pub struct RefreshGuard<'a> {
    store: &'a SnapshotStore,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        self.store.refreshing.store(false, Ordering::SeqCst);
    }
}

/// Current UTC time in the snapshot's `last_updated` format.
#[must_use]
pub fn now_stamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}
