use thiserror::Error;

#[derive(Debug, Error)]
pub enum PeerError {
    #[error("signal store I/O failed: {0}")]
    Store(#[from] std::io::Error),

    #[error("failed to encode signaling data: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("session negotiation failed: {0:#}")]
    Negotiation(anyhow::Error),

    #[error("media unavailable: {0}")]
    Media(String),

    #[error("data channel error: {0}")]
    Channel(String),

    #[error("no active session")]
    NoSession,

    #[error("session is closed")]
    Closed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("peer task stopped")]
    TaskStopped,
}

pub type Result<T, E = PeerError> = std::result::Result<T, E>;
