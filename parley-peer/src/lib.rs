pub mod channel;
pub mod config;
pub mod error;
pub mod media;
pub mod peer;
pub mod session;
pub mod signaling;

pub use channel::{ChatChannel, ChatRoute};
pub use config::PeerConfig;
pub use error::{PeerError, Result};
pub use media::{
    DeviceKind, LocalMedia, MediaAccess, MediaDeviceInfo, MediaDevices, MediaSource, MediaTrack,
    NoMedia, TrackKind,
};
pub use peer::{LoggingObserver, PeerCommand, PeerConnectionManager, PeerHandle, PeerObserver};
pub use session::{
    ChannelLink, ConnectionStats, PeerSession, RemoteTrack, SessionEvent, SessionFactory,
    WebRtcChannelLink, WebRtcSession, WebRtcSessionFactory,
};
pub use signaling::{
    FileStore, MailboxConfig, MemoryStore, ProcessedSignals, SignalStore, SignalingTransport,
    StoreChange,
};
