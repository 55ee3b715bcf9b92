use crate::channel::ChatRoute;
use crate::error::{PeerError, Result};
use crate::media::LocalMedia;
use crate::peer::peer_command::PeerCommand;
use crate::session::ConnectionStats;
use parley_core::{ChatPayload, RoomId};
use tokio::sync::{mpsc, oneshot};

/// Cloneable front for a spawned [`PeerConnectionManager`](crate::PeerConnectionManager).
#[derive(Clone)]
pub struct PeerHandle {
    commands: mpsc::Sender<PeerCommand>,
}

impl PeerHandle {
    pub fn new(commands: mpsc::Sender<PeerCommand>) -> Self {
        Self { commands }
    }

    pub async fn create_session(&self, room: RoomId) -> Result<()> {
        self.request(|reply| PeerCommand::CreateSession { room, reply })
            .await?
    }

    pub async fn start_as_initiator(&self, media: Option<LocalMedia>) -> Result<()> {
        self.request(|reply| PeerCommand::StartAsInitiator { media, reply })
            .await?
    }

    /// Create a session for `room` and answer the offer already waiting there, if any.
    pub async fn join(&self, room: RoomId) -> Result<()> {
        self.request(|reply| PeerCommand::Join { room, reply }).await?
    }

    pub async fn send_chat_message(&self, payload: ChatPayload) -> Result<ChatRoute> {
        self.request(|reply| PeerCommand::SendChat { payload, reply })
            .await?
    }

    pub async fn stats(&self) -> Result<Option<ConnectionStats>> {
        self.request(|reply| PeerCommand::Stats { reply }).await
    }

    pub async fn close(&self) -> Result<()> {
        self.request(|reply| PeerCommand::Close { reply }).await?
    }

    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> PeerCommand,
    ) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| PeerError::TaskStopped)?;
        response.await.map_err(|_| PeerError::TaskStopped)
    }
}
