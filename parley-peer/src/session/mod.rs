mod peer_session;
mod session_event;
mod webrtc_session;

pub use peer_session::{ChannelLink, ConnectionStats, PeerSession, SessionFactory};
pub use session_event::{RemoteTrack, SessionEvent};
pub use webrtc_session::{WebRtcChannelLink, WebRtcSession, WebRtcSessionFactory};
