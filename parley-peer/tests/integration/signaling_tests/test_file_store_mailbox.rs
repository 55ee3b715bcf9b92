use std::sync::Arc;

use parley_core::{RoomId, SessionDescription, SignalBody, SignalMessage};
use parley_peer::{FileStore, MailboxConfig, ProcessedSignals, SignalingTransport};

use crate::integration::init_tracing;

#[tokio::test]
async fn test_two_transports_share_a_directory() {
    init_tracing();

    let dir = std::env::temp_dir().join(format!("parley-mailbox-{}", uuid::Uuid::new_v4()));
    let writer = SignalingTransport::new(
        Arc::new(FileStore::open(&dir).unwrap()),
        MailboxConfig::default(),
    );
    let reader = SignalingTransport::new(
        Arc::new(FileStore::open(&dir).unwrap()),
        MailboxConfig::default(),
    );
    let room = RoomId::parse("tabs").unwrap();

    let offer = SignalMessage::new(SignalBody::Offer {
        offer: SessionDescription::offer("v=0"),
    });
    writer.send(&room, &offer).unwrap();

    assert!(reader.watch().is_none());
    assert_eq!(reader.poll(&room, &ProcessedSignals::new()), vec![offer]);

    reader.clear(&room).unwrap();
    assert!(writer.read(&room).is_empty());

    let _ = std::fs::remove_dir_all(&dir);
}
