use crate::media::LocalMedia;
use crate::session::session_event::SessionEvent;
use anyhow::Result;
use async_trait::async_trait;
use parley_core::{IceCandidate, SessionDescription};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Counters reported for a live session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConnectionStats {
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub messages_sent: u64,
    pub messages_received: u64,
    /// Seconds, from the nominated candidate pair.
    pub round_trip_time: Option<f64>,
}

/// The underlying peer session the manager drives.
///
/// Asynchronous happenings (local candidates, state changes, incoming channels)
/// are not returned here; they arrive on the event channel handed to the
/// [`SessionFactory`].
#[async_trait]
pub trait PeerSession: Send + Sync {
    async fn attach_media(&self, media: &LocalMedia) -> Result<()>;

    /// Create an offer and install it as the local description.
    async fn create_offer(&self) -> Result<SessionDescription>;

    /// Install a remote offer, then create and install the local answer.
    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription>;

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()>;

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()>;

    async fn open_channel(&self, label: &str, ordered: bool) -> Result<Arc<dyn ChannelLink>>;

    async fn stats(&self) -> Result<ConnectionStats>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
pub trait SessionFactory: Send + Sync {
    async fn create(&self, events: mpsc::Sender<SessionEvent>) -> Result<Box<dyn PeerSession>>;
}

/// One data channel of a session, as seen by the chat layer.
#[async_trait]
pub trait ChannelLink: Send + Sync {
    fn label(&self) -> String;

    fn is_open(&self) -> bool;

    async fn send_text(&self, text: String) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
