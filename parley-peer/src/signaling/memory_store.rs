use crate::error::Result;
use crate::signaling::store::{SignalStore, StoreChange};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANGE_CAPACITY: usize = 256;

/// In-process store. Clones share the same entries and change feed, so every
/// peer built from a clone sees every other peer's writes.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, String>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        Self {
            entries: Arc::new(DashMap::new()),
            changes,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&self, key: &str) {
        // No subscribers is fine: pollers still see the write.
        let _ = self.changes.send(StoreChange {
            key: key.to_owned(),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).map(|v| v.value().clone()))
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.entries.insert(key.to_owned(), value);
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_some() {
            self.notify(key);
        }
        Ok(())
    }

    fn watch(&self) -> Option<broadcast::Receiver<StoreChange>> {
        Some(self.changes.subscribe())
    }
}
