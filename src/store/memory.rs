//! In-process document store.
//!
//! Documents form one JSON tree guarded by a single lock; a multi-key
//! `update` therefore commits as one unit, which is what lets a rock push
//! land its three writes without a partial-failure window. Subscribers are
//! notified after the lock is released.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use serde_json::{Map, Value};

use super::{ChangeCallback, DocumentStore, StoreError, Subscription};

struct Subscriber {
    path: String,
    callback: Arc<ChangeCallback>,
}

pub struct MemoryStore {
    root: RwLock<Value>,
    subscribers: Arc<Mutex<HashMap<u64, Subscriber>>>,
    next_subscriber_id: AtomicU64,
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|seg| !seg.is_empty())
}

/// True when one path is a segment-wise prefix of the other. A change at
/// `games/x/players/p` concerns both a `games/x` subscriber and a
/// `games/x/players/p` one.
fn paths_overlap(a: &str, b: &str) -> bool {
    let mut left = segments(a);
    let mut right = segments(b);
    loop {
        match (left.next(), right.next()) {
            (Some(l), Some(r)) if l == r => continue,
            (Some(_), Some(_)) => return false,
            _ => return true,
        }
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for seg in segments(path) {
        node = node.as_object()?.get(seg)?;
    }
    Some(node)
}

fn lookup_mut<'a>(root: &'a mut Value, path: &str) -> Option<&'a mut Value> {
    let mut node = root;
    for seg in segments(path) {
        node = node.as_object_mut()?.get_mut(seg)?;
    }
    Some(node)
}

/// Walk to `path`, creating intermediate objects as needed, and return the
/// slot to write into.
fn ensure_slot<'a>(root: &'a mut Value, path: &str) -> &'a mut Value {
    let mut node = root;
    for seg in segments(path) {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just ensured an object")
            .entry(seg.to_string())
            .or_insert(Value::Null);
    }
    node
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Value::Object(Map::new())),
            subscribers: Arc::new(Mutex::new(HashMap::new())),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Deliver the current document under every subscription overlapping
    /// `changed`. Callbacks run outside both locks.
    fn notify(&self, changed: &str) {
        let interested: Vec<(String, Arc<ChangeCallback>)> = {
            let subscribers = self.subscribers.lock().expect("store lock poisoned");
            subscribers
                .values()
                .filter(|sub| paths_overlap(&sub.path, changed))
                .map(|sub| (sub.path.clone(), sub.callback.clone()))
                .collect()
        };
        for (path, callback) in interested {
            let doc = {
                let root = self.root.read().expect("store lock poisoned");
                lookup(&root, &path).filter(|v| !v.is_null()).cloned()
            };
            callback(doc);
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let root = self.root.read().expect("store lock poisoned");
        Ok(lookup(&root, path).filter(|v| !v.is_null()).cloned())
    }

    fn set(&self, path: &str, document: Value) -> Result<(), StoreError> {
        {
            let mut root = self.root.write().expect("store lock poisoned");
            *ensure_slot(&mut root, path) = document;
        }
        self.notify(path);
        Ok(())
    }

    fn update(
        &self,
        path: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        {
            let mut root = self.root.write().expect("store lock poisoned");
            for (key, value) in fields {
                let full = format!("{path}/{key}");
                *ensure_slot(&mut root, &full) = value;
            }
        }
        self.notify(path);
        Ok(())
    }

    fn remove(&self, path: &str) -> Result<(), StoreError> {
        let removed = {
            let mut root = self.root.write().expect("store lock poisoned");
            let mut segs: Vec<&str> = segments(path).collect();
            match segs.pop() {
                Some(last) => {
                    let parent_path = segs.join("/");
                    lookup_mut(&mut root, &parent_path)
                        .and_then(Value::as_object_mut)
                        .and_then(|map| map.remove(last))
                        .is_some()
                }
                None => false,
            }
        };
        if removed {
            self.notify(path);
        }
        Ok(())
    }

    fn subscribe(&self, path: &str, on_change: ChangeCallback) -> Subscription {
        let callback = Arc::new(on_change);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut subscribers = self.subscribers.lock().expect("store lock poisoned");
            subscribers.insert(
                id,
                Subscriber {
                    path: path.to_string(),
                    callback: callback.clone(),
                },
            );
        }

        // Initial delivery with the current value.
        let current = {
            let root = self.root.read().expect("store lock poisoned");
            lookup(&root, path).filter(|v| !v.is_null()).cloned()
        };
        callback(current);

        let subscribers = self.subscribers.clone();
        Subscription::new(move || {
            if let Ok(mut subscribers) = subscribers.lock() {
                subscribers.remove(&id);
            }
        })
    }
}
