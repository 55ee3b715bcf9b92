use parley_core::MessageId;
use std::collections::HashSet;

/// Ids of signaling messages this peer has already consumed (or sent itself)
/// during the current room session.
#[derive(Debug, Default, Clone)]
pub struct ProcessedSignals {
    ids: HashSet<MessageId>,
}

impl ProcessedSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the id was already present.
    pub fn insert(&mut self, id: MessageId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }
}
