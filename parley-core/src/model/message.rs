use crate::utils::{now_millis, random_base36, to_base36};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier used by receivers to skip signaling messages they already consumed.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct MessageId(String);

impl MessageId {
    /// Random base-36 prefix followed by the current millisecond clock in base 36.
    pub fn new() -> Self {
        Self(format!(
            "{}{}",
            random_base36(13),
            to_base36(now_millis() as u128)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for MessageId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
