pub mod model;
pub mod utils;

pub use model::{
    ChatPayload, ConnectionState, IceCandidate, IceServerConfig, IceState, InvalidRoomId,
    MessageId, PeerPayload, RoomId, SdpKind, SessionDescription, SignalBody, SignalKind,
    SignalMessage, generate_username,
};
