use parley_core::{ChatPayload, PeerPayload, RoomId, SignalBody, SignalKind};
use parley_peer::{ChatRoute, MemoryStore, PeerError};

use crate::integration::{create_test_peer, init_tracing};

#[tokio::test]
async fn test_closed_channel_routes_chat_through_mailbox() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut sender, sessions, _) = create_test_peer(&store);
    let room = RoomId::parse("fallback").unwrap();
    sender.create_session(room.clone()).await.unwrap();
    assert!(!sender.is_channel_open());

    let payload = ChatPayload {
        content: "can anyone hear me?".to_owned(),
        username: "NebulaVoyager42".to_owned(),
        timestamp: 1_700_000_000_000,
    };
    let route = sender.send_chat_message(payload.clone()).await.unwrap();
    assert_eq!(route, ChatRoute::Signaling);

    let mailbox = sender.transport().read(&room);
    let chats: Vec<_> = mailbox
        .iter()
        .filter(|m| m.kind() == SignalKind::ChatMessage)
        .collect();
    assert_eq!(chats.len(), 1);
    assert_eq!(
        chats[0].body,
        SignalBody::ChatMessage {
            data: PeerPayload::Chat(payload)
        }
    );

    assert!(sessions.latest().local_link().sent().is_empty());
}

#[tokio::test]
async fn test_fallback_chat_reaches_other_peer() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut alice, _, alice_events) = create_test_peer(&store);
    let (mut bob, _, bob_events) = create_test_peer(&store);
    let room = RoomId::parse("lobby").unwrap();

    alice.create_session(room.clone()).await.unwrap();
    bob.create_session(room).await.unwrap();

    let payload = ChatPayload::new("hi bob", "AuroraSeeker9");
    alice.send_chat_message(payload.clone()).await.unwrap();

    assert_eq!(bob.poll_signals().await, 1);
    assert_eq!(bob_events.chat_messages().await, vec![payload]);

    // The sender never hears its own message.
    assert_eq!(alice.poll_signals().await, 0);
    assert!(alice_events.chat_messages().await.is_empty());
}

#[tokio::test]
async fn test_chat_without_session_is_rejected() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, _, _) = create_test_peer(&store);

    let result = peer
        .send_chat_message(ChatPayload::new("hello?", "QuantumDreamer5"))
        .await;
    assert!(matches!(result, Err(PeerError::NoSession)));
    assert!(store.is_empty());
}
