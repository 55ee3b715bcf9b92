use crate::error::Result;
use tokio::sync::broadcast;

/// Notification that a key was written or removed by some context sharing the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
}

/// Shared string key-value storage used as the signaling mailbox.
///
/// Every peer that should see the same rooms must be handed the same backing
/// storage. Implementations are synchronous, like the browser storage they stand in for.
pub trait SignalStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;

    /// Change notifications, for backends that can push them. Pollers work without.
    fn watch(&self) -> Option<broadcast::Receiver<StoreChange>> {
        None
    }
}
