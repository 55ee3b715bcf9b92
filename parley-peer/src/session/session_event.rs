use crate::media::TrackKind;
use crate::session::peer_session::ChannelLink;
use bytes::Bytes;
use parley_core::{ConnectionState, IceCandidate, IceState};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTrack {
    pub id: String,
    pub stream_id: String,
    pub kind: TrackKind,
}

/// Events a session emits for the manager's loop.
pub enum SessionEvent {
    /// A local candidate was gathered and must be signaled to the other side.
    CandidateDiscovered(IceCandidate),

    StateChanged(ConnectionState),

    IceStateChanged(IceState),

    RemoteTrack(RemoteTrack),

    /// The remote side opened a channel; its events are already wired.
    ChannelReceived(Arc<dyn ChannelLink>),

    ChannelOpened(String),

    ChannelClosed(String),

    ChannelError(String, String),

    ChannelMessage(String, Bytes),
}

impl fmt::Debug for SessionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CandidateDiscovered(c) => f.debug_tuple("CandidateDiscovered").field(c).finish(),
            Self::StateChanged(s) => f.debug_tuple("StateChanged").field(s).finish(),
            Self::IceStateChanged(s) => f.debug_tuple("IceStateChanged").field(s).finish(),
            Self::RemoteTrack(t) => f.debug_tuple("RemoteTrack").field(t).finish(),
            Self::ChannelReceived(link) => f
                .debug_tuple("ChannelReceived")
                .field(&link.label())
                .finish(),
            Self::ChannelOpened(label) => f.debug_tuple("ChannelOpened").field(label).finish(),
            Self::ChannelClosed(label) => f.debug_tuple("ChannelClosed").field(label).finish(),
            Self::ChannelError(label, err) => f
                .debug_tuple("ChannelError")
                .field(label)
                .field(err)
                .finish(),
            Self::ChannelMessage(label, data) => f
                .debug_tuple("ChannelMessage")
                .field(label)
                .field(&data.len())
                .finish(),
        }
    }
}
