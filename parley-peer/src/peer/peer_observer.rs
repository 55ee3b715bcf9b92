use crate::error::PeerError;
use crate::session::RemoteTrack;
use async_trait::async_trait;
use parley_core::{ChatPayload, ConnectionState, IceState};
use tracing::{debug, error, info, warn};

/// Callbacks a peer reports to its controller. Every slot defaults to a log line.
#[async_trait]
pub trait PeerObserver: Send + Sync + 'static {
    async fn on_state_change(&self, state: ConnectionState) {
        info!("Connection state changed to: {}", state);
    }

    async fn on_ice_state_change(&self, state: IceState) {
        debug!("ICE connection state changed to: {}", state);
    }

    async fn on_remote_track(&self, track: RemoteTrack) {
        info!("Received remote {:?} track {}", track.kind, track.id);
    }

    async fn on_channel_open(&self, label: String) {
        info!("Data channel '{}' is open", label);
    }

    async fn on_channel_close(&self, label: String) {
        info!("Data channel '{}' is closed", label);
    }

    async fn on_channel_error(&self, label: String, error: String) {
        warn!("Data channel '{}' error: {}", label, error);
    }

    async fn on_chat_message(&self, payload: ChatPayload) {
        info!("{}: {}", payload.username, payload.content);
    }

    /// A failure the user should see. The session, if any, stays up.
    async fn on_error(&self, error: &PeerError) {
        error!("{}", error);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingObserver;

impl PeerObserver for LoggingObserver {}
