use async_trait::async_trait;
use parley_core::{ChatPayload, ConnectionState, IceState};
use parley_peer::{PeerError, PeerObserver, RemoteTrack};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Event types that can be recorded by TestPeerObserver.
#[derive(Debug, Clone, PartialEq)]
pub enum PeerEvent {
    State(ConnectionState),
    IceState(IceState),
    Track(RemoteTrack),
    ChannelOpen(String),
    ChannelClose(String),
    ChannelError(String, String),
    Chat(ChatPayload),
    Error(String),
}

/// A test implementation of PeerObserver that records all events.
#[derive(Clone, Default)]
pub struct TestPeerObserver {
    events: Arc<Mutex<Vec<PeerEvent>>>,
}

impl TestPeerObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_events(&self) -> Vec<PeerEvent> {
        self.events.lock().await.clone()
    }

    /// Wait until `matches` holds for some recorded event, with timeout.
    pub async fn wait_for<F>(&self, matches: F, timeout_ms: u64) -> bool
    where
        F: Fn(&PeerEvent) -> bool,
    {
        let start = std::time::Instant::now();
        let timeout = std::time::Duration::from_millis(timeout_ms);

        loop {
            if self.events.lock().await.iter().any(&matches) {
                return true;
            }
            if start.elapsed() > timeout {
                return false;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
    }

    pub async fn wait_for_state(&self, state: ConnectionState, timeout_ms: u64) -> bool {
        self.wait_for(|e| *e == PeerEvent::State(state), timeout_ms)
            .await
    }

    pub async fn states(&self) -> Vec<ConnectionState> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                PeerEvent::State(s) => Some(*s),
                _ => None,
            })
            .collect()
    }

    pub async fn chat_messages(&self) -> Vec<ChatPayload> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                PeerEvent::Chat(payload) => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub async fn errors(&self) -> Vec<String> {
        self.events
            .lock()
            .await
            .iter()
            .filter_map(|e| match e {
                PeerEvent::Error(err) => Some(err.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl PeerObserver for TestPeerObserver {
    async fn on_state_change(&self, state: ConnectionState) {
        tracing::info!("[TestObserver] state: {}", state);
        self.events.lock().await.push(PeerEvent::State(state));
    }

    async fn on_ice_state_change(&self, state: IceState) {
        self.events.lock().await.push(PeerEvent::IceState(state));
    }

    async fn on_remote_track(&self, track: RemoteTrack) {
        self.events.lock().await.push(PeerEvent::Track(track));
    }

    async fn on_channel_open(&self, label: String) {
        self.events.lock().await.push(PeerEvent::ChannelOpen(label));
    }

    async fn on_channel_close(&self, label: String) {
        self.events.lock().await.push(PeerEvent::ChannelClose(label));
    }

    async fn on_channel_error(&self, label: String, error: String) {
        self.events
            .lock()
            .await
            .push(PeerEvent::ChannelError(label, error));
    }

    async fn on_chat_message(&self, payload: ChatPayload) {
        tracing::info!(
            "[TestObserver] chat from {}: {}",
            payload.username,
            payload.content
        );
        self.events.lock().await.push(PeerEvent::Chat(payload));
    }

    async fn on_error(&self, error: &PeerError) {
        tracing::info!("[TestObserver] error: {}", error);
        self.events.lock().await.push(PeerEvent::Error(error.to_string()));
    }
}
