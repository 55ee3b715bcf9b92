use std::sync::Arc;

use parley_core::{IceCandidate, RoomId, SignalBody, SignalMessage};
use parley_peer::{MailboxConfig, MemoryStore, ProcessedSignals, SignalingTransport};

use crate::integration::init_tracing;

fn candidate(n: usize) -> SignalMessage {
    SignalMessage::new(SignalBody::IceCandidate {
        candidate: IceCandidate::new(format!("candidate:{n}")),
    })
}

#[tokio::test]
async fn test_retention_bound_keeps_newest() {
    init_tracing();

    let store = MemoryStore::new();
    let transport = SignalingTransport::new(Arc::new(store), MailboxConfig::default());
    let room = RoomId::parse("busy").unwrap();

    let sent: Vec<SignalMessage> = (0..150).map(candidate).collect();
    for msg in &sent {
        transport.send(&room, msg).unwrap();
    }

    let polled = transport.poll(&room, &ProcessedSignals::new());
    assert!(polled.len() <= 100);
    assert_eq!(polled.last(), sent.last());

    // Compacted to the newest 50 on the 101st send, then 49 more appended.
    assert_eq!(polled, sent[51..].to_vec());
}

#[tokio::test]
async fn test_no_compaction_at_exact_bound() {
    init_tracing();

    let store = MemoryStore::new();
    let transport = SignalingTransport::new(Arc::new(store), MailboxConfig::default());
    let room = RoomId::parse("full").unwrap();

    for n in 0..100 {
        transport.send(&room, &candidate(n)).unwrap();
    }

    assert_eq!(transport.read(&room).len(), 100);
}
