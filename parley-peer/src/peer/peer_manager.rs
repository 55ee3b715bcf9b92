use crate::channel::{ChatChannel, ChatRoute};
use crate::config::PeerConfig;
use crate::error::{PeerError, Result};
use crate::media::LocalMedia;
use crate::peer::peer_command::PeerCommand;
use crate::peer::peer_handle::PeerHandle;
use crate::peer::peer_observer::PeerObserver;
use crate::session::{ConnectionStats, PeerSession, SessionEvent, SessionFactory};
use crate::signaling::{ProcessedSignals, SignalStore, SignalingTransport, StoreChange};
use parley_core::{
    ChatPayload, ConnectionState, IceCandidate, PeerPayload, RoomId, SessionDescription,
    SignalBody, SignalMessage,
};
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Owns one peer session in one room: negotiates it over the mailbox, tracks
/// its state and carries chat over the data channel or, until that opens,
/// over signaling.
///
/// Methods can be driven directly (tests, embedding) or through the task
/// started by [`spawn`](Self::spawn).
pub struct PeerConnectionManager {
    config: PeerConfig,
    transport: SignalingTransport,
    factory: Arc<dyn SessionFactory>,
    observer: Arc<dyn PeerObserver>,
    room: Option<RoomId>,
    session: Option<Box<dyn PeerSession>>,
    session_rx: Option<mpsc::Receiver<SessionEvent>>,
    channel: ChatChannel,
    processed: ProcessedSignals,
    state: ConnectionState,
    is_initiator: bool,
}

impl PeerConnectionManager {
    pub fn new(
        config: PeerConfig,
        store: Arc<dyn SignalStore>,
        factory: Arc<dyn SessionFactory>,
        observer: Arc<dyn PeerObserver>,
    ) -> Self {
        let transport = SignalingTransport::new(store, config.mailbox);

        Self {
            config,
            transport,
            factory,
            observer,
            room: None,
            session: None,
            session_rx: None,
            channel: ChatChannel::new(),
            processed: ProcessedSignals::new(),
            state: ConnectionState::Disconnected,
            is_initiator: false,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_initiator(&self) -> bool {
        self.is_initiator
    }

    pub fn room(&self) -> Option<&RoomId> {
        self.room.as_ref()
    }

    pub fn transport(&self) -> &SignalingTransport {
        &self.transport
    }

    pub fn is_channel_open(&self) -> bool {
        self.channel.is_open()
    }

    /// Start a fresh session for `room`, replacing any previous one.
    ///
    /// The chat channel is created here for both roles; the responder also
    /// adopts the channel the initiator opens.
    pub async fn create_session(&mut self, room: RoomId) -> Result<()> {
        if self.session.is_some() {
            debug!("Replacing existing session");
            self.teardown().await;
        }

        self.processed.clear();
        self.is_initiator = false;
        self.state = ConnectionState::Disconnected;
        self.room = Some(room.clone());

        let (events_tx, events_rx) = mpsc::channel(256);
        let session = self
            .factory
            .create(events_tx)
            .await
            .map_err(PeerError::Negotiation)?;

        let link = session
            .open_channel(&self.config.channel_label, self.config.channel_ordered)
            .await
            .map_err(PeerError::Negotiation)?;
        self.channel.adopt(link);

        self.session = Some(session);
        self.session_rx = Some(events_rx);

        info!("Peer session created for room: {}", room);
        Ok(())
    }

    /// Attach `media` (if any), produce the offer and publish it.
    ///
    /// A failure to attach media is reported but does not stop the offer.
    pub async fn start_as_initiator(&mut self, media: Option<&LocalMedia>) -> Result<()> {
        self.ensure_open()?;
        let session = self.session.as_ref().ok_or(PeerError::NoSession)?;
        self.is_initiator = true;

        if let Some(media) = media
            && let Err(e) = session.attach_media(media).await
        {
            let err = PeerError::Media(format!("{e:#}"));
            warn!("Continuing without local media: {}", err);
            self.observer.on_error(&err).await;
        }

        let offer = session
            .create_offer()
            .await
            .map_err(PeerError::Negotiation)?;
        self.send_signal(SignalBody::Offer { offer })?;

        info!("Call initiated");
        self.set_state(ConnectionState::Connecting).await;
        Ok(())
    }

    /// Responder side of the handshake. Ignored on the initiator.
    pub async fn handle_offer(&mut self, offer: SessionDescription) -> Result<()> {
        if self.is_initiator {
            debug!("Ignoring offer: this peer is the initiator");
            return Ok(());
        }
        self.ensure_open()?;
        let session = self.session.as_ref().ok_or(PeerError::NoSession)?;

        let answer = session
            .accept_offer(offer)
            .await
            .map_err(PeerError::Negotiation)?;
        self.send_signal(SignalBody::Answer { answer })?;

        info!("Offer handled, answer sent");
        self.set_state(ConnectionState::Connecting).await;
        Ok(())
    }

    /// Initiator side of the handshake. Ignored on the responder.
    pub async fn handle_answer(&mut self, answer: SessionDescription) -> Result<()> {
        if !self.is_initiator {
            debug!("Ignoring answer: this peer is not the initiator");
            return Ok(());
        }
        self.ensure_open()?;
        let session = self.session.as_ref().ok_or(PeerError::NoSession)?;

        session
            .accept_answer(answer)
            .await
            .map_err(PeerError::Negotiation)?;

        info!("Answer handled");
        Ok(())
    }

    /// Add a remote candidate. A rejected candidate is logged and dropped;
    /// the session carries on.
    pub async fn handle_candidate(&mut self, candidate: IceCandidate) {
        let Some(session) = self.session.as_ref() else {
            debug!("Dropping remote candidate: no session");
            return;
        };
        let Err(e) = session.add_remote_candidate(candidate).await else {
            debug!("ICE candidate added");
            return;
        };
        warn!("Failed to add ICE candidate: {:#}", e);
    }

    /// Dispatch one mailbox message by type, marking it processed first.
    pub async fn handle_signal(&mut self, message: SignalMessage) {
        if !self.processed.insert(message.id.clone()) {
            return;
        }
        debug!("Handling {} signal {}", message.kind(), message.id);

        let result = match message.body {
            SignalBody::Offer { offer } => self.handle_offer(offer).await,
            SignalBody::Answer { answer } => self.handle_answer(answer).await,
            SignalBody::IceCandidate { candidate } => {
                self.handle_candidate(candidate).await;
                Ok(())
            }
            SignalBody::ChatMessage { data } => {
                self.deliver(data).await;
                Ok(())
            }
        };

        if let Err(e) = result {
            error!("Failed to handle {} signal: {}", message.id, e);
            self.observer.on_error(&e).await;
        }
    }

    /// Handle every message in the room's mailbox this peer has not seen yet.
    /// Returns how many were handled.
    pub async fn poll_signals(&mut self) -> usize {
        let Some(room) = self.room.clone() else {
            return 0;
        };
        if self.state.is_terminal() {
            return 0;
        }

        let pending = self.transport.poll(&room, &self.processed);
        let count = pending.len();
        for message in pending {
            self.handle_signal(message).await;
        }
        count
    }

    pub async fn process_session_event(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::CandidateDiscovered(candidate) => {
                match self.send_signal(SignalBody::IceCandidate { candidate }) {
                    Ok(()) => {}
                    Err(PeerError::Closed) => debug!("Dropping local candidate: session closed"),
                    Err(e) => warn!("Failed to signal local candidate: {}", e),
                }
            }

            SessionEvent::StateChanged(state) => self.set_state(state).await,

            SessionEvent::IceStateChanged(state) => self.observer.on_ice_state_change(state).await,

            SessionEvent::RemoteTrack(track) => self.observer.on_remote_track(track).await,

            SessionEvent::ChannelReceived(link) => self.channel.adopt(link),

            SessionEvent::ChannelOpened(label) => self.observer.on_channel_open(label).await,

            SessionEvent::ChannelClosed(label) => self.observer.on_channel_close(label).await,

            SessionEvent::ChannelError(label, error) => {
                self.observer.on_channel_error(label, error).await
            }

            SessionEvent::ChannelMessage(label, data) => match ChatChannel::decode(&data) {
                Ok(payload) => self.deliver(payload).await,
                Err(e) => warn!("Dropping unreadable frame on '{}': {}", label, e),
            },
        }
    }

    /// Process session events that are already queued, without waiting.
    pub async fn drain_session_events(&mut self) -> usize {
        let mut count = 0;
        while let Some(event) = self.try_next_session_event() {
            self.process_session_event(event).await;
            count += 1;
        }
        count
    }

    /// Send over the data channel if it is open, otherwise as a `chat-message` signal.
    pub async fn send_chat_message(&mut self, payload: ChatPayload) -> Result<ChatRoute> {
        self.ensure_open()?;
        let payload = PeerPayload::Chat(payload);

        if self.channel.send(&payload).await? {
            return Ok(ChatRoute::Direct);
        }

        debug!("Data channel not open, routing chat through signaling");
        self.send_signal(SignalBody::ChatMessage { data: payload })?;
        Ok(ChatRoute::Signaling)
    }

    pub async fn stats(&self) -> Option<ConnectionStats> {
        let session = self.session.as_ref()?;
        match session.stats().await {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!("Failed to get connection stats: {:#}", e);
                None
            }
        }
    }

    /// Release the channel and session, clear the room's mailbox and mark the
    /// peer `closed`. Calling it again does nothing.
    pub async fn close(&mut self) -> Result<()> {
        if self.state.is_terminal() && self.session.is_none() && self.room.is_none() {
            return Ok(());
        }

        self.teardown().await;

        if let Some(room) = self.room.take()
            && let Err(e) = self.transport.clear(&room)
        {
            warn!("Failed to clear mailbox for room {}: {}", room, e);
        }
        self.processed.clear();
        self.set_state(ConnectionState::Closed).await;

        info!("Connection closed");
        Ok(())
    }

    pub fn spawn(self) -> PeerHandle {
        let (tx, rx) = mpsc::channel(100);
        tokio::spawn(self.run(rx));
        PeerHandle::new(tx)
    }

    pub async fn run(mut self, mut command_rx: mpsc::Receiver<PeerCommand>) {
        info!("Peer event loop started");

        let mut ticker = time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut changes = self.transport.watch();

        loop {
            tokio::select! {
                cmd = command_rx.recv() => {
                    match cmd {
                        Some(c) => self.handle_command(c).await,
                        None => {
                            info!("Command channel closed. Shutting down peer.");
                            break;
                        }
                    }
                }

                evt = self.next_session_event() => {
                    match evt {
                        Some(e) => self.process_session_event(e).await,
                        None => {
                            debug!("Session event channel closed");
                            self.session_rx = None;
                        }
                    }
                }

                _ = ticker.tick() => {
                    self.poll_signals().await;
                }

                change = next_change(&mut changes) => {
                    match change {
                        Ok(change) if self.watches(&change) => {
                            self.poll_signals().await;
                        }
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            debug!("Missed {} store notifications", skipped);
                            self.poll_signals().await;
                        }
                        Err(RecvError::Closed) => changes = None,
                    }
                }
            }
        }

        if let Err(e) = self.close().await {
            warn!("Failed to close peer on shutdown: {}", e);
        }
        info!("Peer event loop finished");
    }

    async fn handle_command(&mut self, cmd: PeerCommand) {
        match cmd {
            PeerCommand::CreateSession { room, reply } => {
                let _ = reply.send(self.create_session(room).await);
            }

            PeerCommand::StartAsInitiator { media, reply } => {
                let _ = reply.send(self.start_as_initiator(media.as_ref()).await);
            }

            PeerCommand::Join { room, reply } => {
                let result = self.create_session(room).await;
                if result.is_ok() {
                    self.poll_signals().await;
                }
                let _ = reply.send(result);
            }

            PeerCommand::SendChat { payload, reply } => {
                let _ = reply.send(self.send_chat_message(payload).await);
            }

            PeerCommand::Stats { reply } => {
                let _ = reply.send(self.stats().await);
            }

            PeerCommand::Close { reply } => {
                let _ = reply.send(self.close().await);
            }
        }
    }

    fn send_signal(&mut self, body: SignalBody) -> Result<()> {
        self.ensure_open()?;
        let room = self.room.as_ref().ok_or(PeerError::NoSession)?;

        let message = SignalMessage::new(body);
        self.processed.insert(message.id.clone());
        self.transport.send(room, &message)
    }

    async fn deliver(&self, payload: PeerPayload) {
        match payload {
            PeerPayload::Chat(chat) => self.observer.on_chat_message(chat).await,
        }
    }

    async fn set_state(&mut self, next: ConnectionState) {
        if !self.state.can_transition_to(next) {
            return;
        }
        info!("Connection state: {} -> {}", self.state, next);
        self.state = next;
        self.observer.on_state_change(next).await;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state.is_terminal() {
            return Err(PeerError::Closed);
        }
        Ok(())
    }

    async fn teardown(&mut self) {
        self.session_rx = None;
        self.channel.close().await;

        let Some(session) = self.session.take() else {
            return;
        };
        if let Err(e) = session.close().await {
            warn!("Failed to close session: {:#}", e);
        }
    }

    fn watches(&self, change: &StoreChange) -> bool {
        self.room
            .as_ref()
            .is_some_and(|room| change.key == SignalingTransport::mailbox_key(room))
    }

    fn try_next_session_event(&mut self) -> Option<SessionEvent> {
        self.session_rx.as_mut()?.try_recv().ok()
    }

    async fn next_session_event(&mut self) -> Option<SessionEvent> {
        match self.session_rx.as_mut() {
            Some(rx) => rx.recv().await,
            None => std::future::pending().await,
        }
    }
}

async fn next_change(
    changes: &mut Option<broadcast::Receiver<StoreChange>>,
) -> std::result::Result<StoreChange, RecvError> {
    match changes.as_mut() {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
