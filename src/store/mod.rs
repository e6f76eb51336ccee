//! Document store abstraction.
//!
//! The game state lives in an external document store addressed by
//! slash-separated paths (`games/{id}`, `users/{uid}`, ...). This module
//! defines the contract the rest of the crate programs against; the
//! in-process implementation lives in [`memory`].

use std::fmt;

use serde_json::Value;

pub mod memory;
pub mod view;

pub use memory::MemoryStore;
pub use view::SyncedView;

#[derive(Debug, Clone, PartialEq)]
pub struct StoreError(pub String);

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for StoreError {}

/// Invoked with the subscribed document after every change under its path,
/// and once on subscription with the current value. `None` means absent.
pub type ChangeCallback = Box<dyn Fn(Option<Value>) + Send + Sync>;

/// Dropping the guard cancels the subscription.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self { cancel: Some(Box::new(cancel)) }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// Read the document at `path`, or `None` if absent.
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Full overwrite of the document at `path`.
    fn set(&self, path: &str, document: Value) -> Result<(), StoreError>;

    /// Merge-patch relative to `path`. Field keys may themselves be
    /// slash-separated paths; every entry in one call is applied under a
    /// single lock, so multi-key updates are atomic.
    fn update(
        &self,
        path: &str,
        fields: serde_json::Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Remove the document at `path`. Removing an absent path is a no-op.
    fn remove(&self, path: &str) -> Result<(), StoreError>;

    /// Watch the document at `path`. The callback fires immediately with
    /// the current value, then after every overlapping change.
    fn subscribe(&self, path: &str, on_change: ChangeCallback) -> Subscription;
}
