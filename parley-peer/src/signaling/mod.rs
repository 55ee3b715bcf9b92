mod file_store;
mod mailbox;
mod memory_store;
mod processed;
mod store;

pub use file_store::FileStore;
pub use mailbox::{MailboxConfig, SignalingTransport};
pub use memory_store::MemoryStore;
pub use processed::ProcessedSignals;
pub use store::{SignalStore, StoreChange};
