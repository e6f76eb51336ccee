//! Synchronized read-through view over one stored document.
//!
//! The cached value changes only when a subscription notification arrives;
//! there is no way to mutate it locally, so a stale read here means the
//! store has not confirmed a write yet, never that an optimistic local
//! change diverged.

use std::sync::{Arc, RwLock};

use serde::de::DeserializeOwned;

use super::{DocumentStore, Subscription};

pub struct SyncedView<T> {
    current: Arc<RwLock<Option<T>>>,
    _subscription: Subscription,
}

impl<T: DeserializeOwned + Send + Sync + 'static> SyncedView<T> {
    /// Subscribe to `path` and keep the decoded document cached. A document
    /// that fails to decode clears the cache rather than keeping a stale
    /// value.
    pub fn new(store: &dyn DocumentStore, path: &str) -> Self {
        let current = Arc::new(RwLock::new(None));
        let slot = current.clone();
        let subscription = store.subscribe(
            path,
            Box::new(move |doc| {
                let decoded = doc.and_then(|value| serde_json::from_value(value).ok());
                if let Ok(mut guard) = slot.write() {
                    *guard = decoded;
                }
            }),
        );
        Self {
            current,
            _subscription: subscription,
        }
    }
}

impl<T: Clone> SyncedView<T> {
    /// Latest value pushed by the store, or `None` while absent.
    pub fn get(&self) -> Option<T> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }
}
