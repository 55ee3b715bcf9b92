use crate::error::Result;
use crate::session::ChannelLink;
use futures::future::join_all;
use parley_core::PeerPayload;
use std::sync::Arc;
use tracing::{debug, warn};

/// How a chat payload left this peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRoute {
    /// Sent over an open data channel.
    Direct,
    /// Channel not open; carried as a `chat-message` signal instead.
    Signaling,
}

/// The chat pipe of one session.
///
/// Holds the channel this peer created plus any channel the remote side
/// opened. Whichever is open first carries outgoing payloads; all of them
/// deliver incoming ones.
#[derive(Default)]
pub struct ChatChannel {
    links: Vec<Arc<dyn ChannelLink>>,
}

impl ChatChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn adopt(&mut self, link: Arc<dyn ChannelLink>) {
        debug!("Adopting data channel '{}'", link.label());
        self.links.push(link);
    }

    pub fn is_open(&self) -> bool {
        self.links.iter().any(|link| link.is_open())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Returns `Ok(false)` when no link could carry the payload and the caller
    /// has to fall back to signaling.
    pub async fn send(&self, payload: &PeerPayload) -> Result<bool> {
        let Some(link) = self.links.iter().find(|link| link.is_open()) else {
            return Ok(false);
        };

        let text = payload.to_json()?;
        match link.send_text(text).await {
            Ok(()) => Ok(true),
            Err(e) => {
                warn!("Send on data channel '{}' failed: {:#}", link.label(), e);
                Ok(false)
            }
        }
    }

    pub fn decode(data: &[u8]) -> Result<PeerPayload> {
        Ok(PeerPayload::from_slice(data)?)
    }

    pub async fn close(&mut self) {
        let links = std::mem::take(&mut self.links);
        let results = join_all(links.iter().map(|link| link.close())).await;

        for (link, result) in links.iter().zip(results) {
            if let Err(e) = result {
                debug!("Closing data channel '{}' failed: {:#}", link.label(), e);
            }
        }
    }
}
