use crate::error::{PeerError, Result};
use crate::signaling::processed::ProcessedSignals;
use crate::signaling::store::{SignalStore, StoreChange};
use parley_core::{RoomId, SignalMessage};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

pub const MAILBOX_KEY_PREFIX: &str = "webrtc_signal_";

/// Retention policy for a room mailbox: once a send pushes the mailbox past
/// `retention_bound` entries it is cut back to the newest `compact_to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MailboxConfig {
    retention_bound: usize,
    compact_to: usize,
}

impl MailboxConfig {
    pub fn new(retention_bound: usize, compact_to: usize) -> Result<Self> {
        if retention_bound == 0 || compact_to == 0 {
            return Err(PeerError::Config(
                "mailbox retention must keep at least one message".to_owned(),
            ));
        }
        if compact_to > retention_bound {
            return Err(PeerError::Config(format!(
                "mailbox compaction target {compact_to} exceeds retention bound {retention_bound}"
            )));
        }
        Ok(Self {
            retention_bound,
            compact_to,
        })
    }

    pub fn retention_bound(&self) -> usize {
        self.retention_bound
    }

    pub fn compact_to(&self) -> usize {
        self.compact_to
    }
}

impl Default for MailboxConfig {
    fn default() -> Self {
        Self {
            retention_bound: 100,
            compact_to: 50,
        }
    }
}

/// Signaling over a shared key-value store: each room is a JSON array of
/// messages under `webrtc_signal_<room>`, appended by senders and re-read by pollers.
///
/// There is no lock around the read-modify-write in [`send`](Self::send), so two
/// writers racing on one room can hide each other's message until a later write.
#[derive(Clone)]
pub struct SignalingTransport {
    store: Arc<dyn SignalStore>,
    config: MailboxConfig,
}

impl SignalingTransport {
    pub fn new(store: Arc<dyn SignalStore>, config: MailboxConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> MailboxConfig {
        self.config
    }

    pub fn mailbox_key(room: &RoomId) -> String {
        format!("{MAILBOX_KEY_PREFIX}{room}")
    }

    pub fn send(&self, room: &RoomId, message: &SignalMessage) -> Result<()> {
        let key = Self::mailbox_key(room);
        let mut entries = self.load(&key);

        entries.push(serde_json::to_value(message)?);
        if entries.len() > self.config.retention_bound {
            let excess = entries.len() - self.config.compact_to;
            entries.drain(..excess);
            debug!("Compacted mailbox {} to {} entries", key, entries.len());
        }

        self.store.set(&key, serde_json::to_string(&entries)?)?;
        debug!("Signal {} ({}) -> {}", message.id, message.kind(), key);
        Ok(())
    }

    /// Messages not yet in `processed`, in mailbox order.
    pub fn poll(&self, room: &RoomId, processed: &ProcessedSignals) -> Vec<SignalMessage> {
        self.read(room)
            .into_iter()
            .filter(|m| !processed.contains(&m.id))
            .collect()
    }

    /// Every well-formed message currently in the room's mailbox.
    pub fn read(&self, room: &RoomId) -> Vec<SignalMessage> {
        let key = Self::mailbox_key(room);
        self.load(&key)
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<SignalMessage>(entry) {
                Ok(message) => Some(message),
                Err(e) => {
                    debug!("Skipping unreadable entry in {}: {}", key, e);
                    None
                }
            })
            .collect()
    }

    pub fn clear(&self, room: &RoomId) -> Result<()> {
        self.store.remove(&Self::mailbox_key(room))
    }

    pub fn watch(&self) -> Option<broadcast::Receiver<StoreChange>> {
        self.store.watch()
    }

    /// Raw entries, kept as JSON values so entries this build cannot parse survive a rewrite.
    fn load(&self, key: &str) -> Vec<Value> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read mailbox {}: {}", key, e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Value>>(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                debug!("Mailbox {} is malformed, treating as empty: {}", key, e);
                Vec::new()
            }
        }
    }
}
