use crate::utils::random_base36;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("room id must not be empty")]
pub struct InvalidRoomId;

/// Opaque token naming a shared session. Two peers that agree on it share a mailbox.
#[derive(Debug, Serialize, Deserialize, Clone, Hash, Eq, PartialEq)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Fresh random id: two base-36 runs of 13 characters each.
    pub fn new() -> Self {
        Self(format!("{}{}", random_base36(13), random_base36(13)))
    }

    /// Parse user input; surrounding whitespace is dropped and an empty id is rejected.
    pub fn parse(input: &str) -> Result<Self, InvalidRoomId> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvalidRoomId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RoomId {
    fn default() -> Self {
        Self::new()
    }
}

impl FromStr for RoomId {
    type Err = InvalidRoomId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
