mod identity;
mod message;
mod payload;
mod room;
mod signaling;
mod state;

pub use identity::generate_username;
pub use message::MessageId;
pub use payload::{ChatPayload, PeerPayload};
pub use room::{InvalidRoomId, RoomId};
pub use signaling::{
    IceCandidate, IceServerConfig, SdpKind, SessionDescription, SignalBody, SignalKind,
    SignalMessage,
};
pub use state::{ConnectionState, IceState};
