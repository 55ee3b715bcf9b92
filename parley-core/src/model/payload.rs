use crate::utils::now_millis;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatPayload {
    pub content: String,
    pub username: String,
    pub timestamp: u64,
}

impl ChatPayload {
    pub fn new(content: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            username: username.into(),
            timestamp: now_millis(),
        }
    }
}

/// Application frame carried over the data channel, or inside a `chat-message`
/// signal when the channel is not open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PeerPayload {
    Chat(ChatPayload),
}

impl PeerPayload {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_slice(data: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(data)
    }
}

impl From<ChatPayload> for PeerPayload {
    fn from(chat: ChatPayload) -> Self {
        Self::Chat(chat)
    }
}
