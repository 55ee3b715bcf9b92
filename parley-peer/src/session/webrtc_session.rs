use crate::media::{LocalMedia, TrackKind};
use crate::session::peer_session::{ChannelLink, ConnectionStats, PeerSession, SessionFactory};
use crate::session::session_event::{RemoteTrack, SessionEvent};
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use parley_core::{
    ConnectionState, IceCandidate, IceServerConfig, IceState, SdpKind, SessionDescription,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8, MediaEngine};
use webrtc::data_channel::RTCDataChannel;
use webrtc::data_channel::data_channel_init::RTCDataChannelInit;
use webrtc::data_channel::data_channel_message::DataChannelMessage;
use webrtc::data_channel::data_channel_state::RTCDataChannelState;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_connection_state::RTCIceConnectionState;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::rtp_transceiver::RTCRtpTransceiver;
use webrtc::rtp_transceiver::rtp_codec::{RTCRtpCodecCapability, RTPCodecType};
use webrtc::rtp_transceiver::rtp_receiver::RTCRtpReceiver;
use webrtc::stats::StatsReportType;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

/// Builds webrtc-rs backed sessions using the configured ICE servers.
#[derive(Clone)]
pub struct WebRtcSessionFactory {
    ice_servers: Vec<IceServerConfig>,
}

impl WebRtcSessionFactory {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self { ice_servers }
    }
}

#[async_trait]
impl SessionFactory for WebRtcSessionFactory {
    async fn create(&self, events: mpsc::Sender<SessionEvent>) -> Result<Box<dyn PeerSession>> {
        let session = WebRtcSession::new(&self.ice_servers, events).await?;
        Ok(Box::new(session))
    }
}

pub struct WebRtcSession {
    peer_connection: Arc<RTCPeerConnection>,
    events: mpsc::Sender<SessionEvent>,
}

impl WebRtcSession {
    /// Build the peer connection and route its callbacks into `events`.
    pub async fn new(
        ice_servers: &[IceServerConfig],
        events: mpsc::Sender<SessionEvent>,
    ) -> Result<Self> {
        let mut m = MediaEngine::default();
        m.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut m)?;

        let api = APIBuilder::new()
            .with_media_engine(m)
            .with_interceptor_registry(registry)
            .build();

        let rtc_config = RTCConfiguration {
            ice_servers: ice_servers
                .iter()
                .map(|server| RTCIceServer {
                    urls: server.urls.clone(),
                    username: server.username.clone().unwrap_or_default(),
                    credential: server.credential.clone().unwrap_or_default(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = events.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state changed: {}", s);
                    if let Some(state) = map_connection_state(s) {
                        let _ = tx.send(SessionEvent::StateChanged(state)).await;
                    }
                })
            },
        ));

        let ice_state_tx = events.clone();
        peer_connection.on_ice_connection_state_change(Box::new(
            move |s: RTCIceConnectionState| {
                let tx = ice_state_tx.clone();

                Box::pin(async move {
                    debug!("ICE connection state changed: {}", s);
                    if let Some(state) = map_ice_state(s) {
                        let _ = tx.send(SessionEvent::IceStateChanged(state)).await;
                    }
                })
            },
        ));

        let ice_tx = events.clone();
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let init = match candidate.to_json() {
                    Ok(init) => init,
                    Err(e) => {
                        warn!("Failed to serialize local ICE candidate: {}", e);
                        return;
                    }
                };
                let _ = tx
                    .send(SessionEvent::CandidateDiscovered(IceCandidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_mline_index: init.sdp_mline_index,
                        username_fragment: init.username_fragment,
                    }))
                    .await;
            })
        }));

        let track_tx = events.clone();
        peer_connection.on_track(Box::new(
            move |track: Arc<TrackRemote>,
                  _receiver: Arc<RTCRtpReceiver>,
                  _transceiver: Arc<RTCRtpTransceiver>| {
                let tx = track_tx.clone();

                Box::pin(async move {
                    let kind = match track.kind() {
                        RTPCodecType::Audio => TrackKind::Audio,
                        RTPCodecType::Video => TrackKind::Video,
                        other => {
                            debug!("Ignoring remote track of kind {:?}", other);
                            return;
                        }
                    };
                    info!("Received remote {:?} track {}", kind, track.id());
                    let _ = tx
                        .send(SessionEvent::RemoteTrack(RemoteTrack {
                            id: track.id(),
                            stream_id: track.stream_id(),
                            kind,
                        }))
                        .await;
                })
            },
        ));

        let dc_tx = events.clone();
        peer_connection.on_data_channel(Box::new(move |dc: Arc<RTCDataChannel>| {
            let tx = dc_tx.clone();

            Box::pin(async move {
                debug!("Remote opened data channel '{}'", dc.label());
                wire_channel(&dc, &tx);
                let link: Arc<dyn ChannelLink> = Arc::new(WebRtcChannelLink::new(dc));
                let _ = tx.send(SessionEvent::ChannelReceived(link)).await;
            })
        }));

        Ok(Self {
            peer_connection,
            events,
        })
    }
}

#[async_trait]
impl PeerSession for WebRtcSession {
    async fn attach_media(&self, media: &LocalMedia) -> Result<()> {
        for track in &media.tracks {
            let codec = match track.kind {
                TrackKind::Audio => RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_OPUS.to_owned(),
                    clock_rate: 48000,
                    channels: 2,
                    ..Default::default()
                },
                TrackKind::Video => RTCRtpCodecCapability {
                    mime_type: MIME_TYPE_VP8.to_owned(),
                    clock_rate: 90000,
                    ..Default::default()
                },
            };
            let local = Arc::new(TrackLocalStaticSample::new(
                codec,
                track.id.clone(),
                media.stream_id.clone(),
            ));
            self.peer_connection
                .add_track(local as Arc<dyn TrackLocal + Send + Sync>)
                .await
                .with_context(|| format!("Failed to attach track {}", track.id))?;
        }
        Ok(())
    }

    async fn create_offer(&self) -> Result<SessionDescription> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(SessionDescription::offer(offer.sdp))
    }

    async fn accept_offer(&self, offer: SessionDescription) -> Result<SessionDescription> {
        if offer.kind != SdpKind::Offer {
            bail!("Expected an offer description, got {:?}", offer.kind);
        }
        let desc = RTCSessionDescription::offer(offer.sdp)?;
        self.peer_connection.set_remote_description(desc).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(SessionDescription::answer(answer.sdp))
    }

    async fn accept_answer(&self, answer: SessionDescription) -> Result<()> {
        if answer.kind != SdpKind::Answer {
            bail!("Expected an answer description, got {:?}", answer.kind);
        }
        let desc = RTCSessionDescription::answer(answer.sdp)?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_remote_candidate(&self, candidate: IceCandidate) -> Result<()> {
        let init = RTCIceCandidateInit {
            candidate: candidate.candidate,
            sdp_mid: candidate.sdp_mid,
            sdp_mline_index: candidate.sdp_mline_index,
            username_fragment: candidate.username_fragment,
        };
        self.peer_connection.add_ice_candidate(init).await?;
        Ok(())
    }

    async fn open_channel(&self, label: &str, ordered: bool) -> Result<Arc<dyn ChannelLink>> {
        let init = RTCDataChannelInit {
            ordered: Some(ordered),
            ..Default::default()
        };
        let dc = self
            .peer_connection
            .create_data_channel(label, Some(init))
            .await
            .context("Failed to create data channel")?;
        wire_channel(&dc, &self.events);
        Ok(Arc::new(WebRtcChannelLink::new(dc)))
    }

    async fn stats(&self) -> Result<ConnectionStats> {
        let report = self.peer_connection.get_stats().await;
        let mut stats = ConnectionStats::default();

        for entry in report.reports.into_values() {
            match entry {
                StatsReportType::DataChannel(dc) => {
                    stats.bytes_sent += dc.bytes_sent as u64;
                    stats.bytes_received += dc.bytes_received as u64;
                    stats.messages_sent += dc.messages_sent as u64;
                    stats.messages_received += dc.messages_received as u64;
                }
                StatsReportType::CandidatePair(pair) if pair.nominated => {
                    stats.round_trip_time = Some(pair.current_round_trip_time);
                }
                _ => {}
            }
        }

        Ok(stats)
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}

/// Route one channel's callbacks into the session event stream. Used for both
/// the channel we create and the one the remote side opens.
fn wire_channel(dc: &Arc<RTCDataChannel>, events: &mpsc::Sender<SessionEvent>) {
    let label = dc.label().to_owned();

    let (open_tx, open_label) = (events.clone(), label.clone());
    dc.on_open(Box::new(move || {
        let tx = open_tx.clone();
        let label = open_label.clone();
        Box::pin(async move {
            info!("Data channel '{}' open", label);
            let _ = tx.send(SessionEvent::ChannelOpened(label)).await;
        })
    }));

    let (close_tx, close_label) = (events.clone(), label.clone());
    dc.on_close(Box::new(move || {
        let tx = close_tx.clone();
        let label = close_label.clone();
        Box::pin(async move {
            info!("Data channel '{}' closed", label);
            let _ = tx.send(SessionEvent::ChannelClosed(label)).await;
        })
    }));

    let (err_tx, err_label) = (events.clone(), label.clone());
    dc.on_error(Box::new(move |err: webrtc::Error| {
        let tx = err_tx.clone();
        let label = err_label.clone();
        Box::pin(async move {
            warn!("Data channel '{}' error: {}", label, err);
            let _ = tx
                .send(SessionEvent::ChannelError(label, err.to_string()))
                .await;
        })
    }));

    let (msg_tx, msg_label) = (events.clone(), label);
    dc.on_message(Box::new(move |msg: DataChannelMessage| {
        let tx = msg_tx.clone();
        let label = msg_label.clone();
        Box::pin(async move {
            let _ = tx.send(SessionEvent::ChannelMessage(label, msg.data)).await;
        })
    }));
}

fn map_connection_state(state: RTCPeerConnectionState) -> Option<ConnectionState> {
    match state {
        RTCPeerConnectionState::Connecting => Some(ConnectionState::Connecting),
        RTCPeerConnectionState::Connected => Some(ConnectionState::Connected),
        RTCPeerConnectionState::Disconnected => Some(ConnectionState::Disconnected),
        RTCPeerConnectionState::Failed => Some(ConnectionState::Failed),
        RTCPeerConnectionState::Closed => Some(ConnectionState::Closed),
        _ => None,
    }
}

fn map_ice_state(state: RTCIceConnectionState) -> Option<IceState> {
    match state {
        RTCIceConnectionState::New => Some(IceState::New),
        RTCIceConnectionState::Checking => Some(IceState::Checking),
        RTCIceConnectionState::Connected => Some(IceState::Connected),
        RTCIceConnectionState::Completed => Some(IceState::Completed),
        RTCIceConnectionState::Disconnected => Some(IceState::Disconnected),
        RTCIceConnectionState::Failed => Some(IceState::Failed),
        RTCIceConnectionState::Closed => Some(IceState::Closed),
        _ => None,
    }
}

pub struct WebRtcChannelLink {
    dc: Arc<RTCDataChannel>,
}

impl WebRtcChannelLink {
    pub fn new(dc: Arc<RTCDataChannel>) -> Self {
        Self { dc }
    }
}

#[async_trait]
impl ChannelLink for WebRtcChannelLink {
    fn label(&self) -> String {
        self.dc.label().to_owned()
    }

    fn is_open(&self) -> bool {
        self.dc.ready_state() == RTCDataChannelState::Open
    }

    async fn send_text(&self, text: String) -> Result<()> {
        self.dc.send_text(text).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.dc.close().await?;
        Ok(())
    }
}
