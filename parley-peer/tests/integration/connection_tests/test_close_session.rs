use parley_core::{ChatPayload, ConnectionState, RoomId};
use parley_peer::{MemoryStore, PeerError, SessionEvent, SignalStore, SignalingTransport};

use crate::integration::{create_test_peer, init_tracing};

#[tokio::test]
async fn test_close_releases_session_and_clears_mailbox() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, sessions, observer) = create_test_peer(&store);
    let room = RoomId::parse("bye").unwrap();

    peer.create_session(room.clone()).await.unwrap();
    peer.start_as_initiator(None).await.unwrap();
    assert_eq!(peer.transport().read(&room).len(), 1);

    peer.close().await.unwrap();

    let probe = sessions.latest();
    assert!(probe.log().closed);
    assert!(probe.local_link().is_closed());
    assert!(
        store
            .get(&SignalingTransport::mailbox_key(&room))
            .unwrap()
            .is_none()
    );
    assert_eq!(peer.state(), ConnectionState::Closed);
    assert!(peer.room().is_none());
    assert_eq!(
        observer.states().await,
        vec![ConnectionState::Connecting, ConnectionState::Closed]
    );
}

#[tokio::test]
async fn test_close_is_idempotent() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, _, observer) = create_test_peer(&store);
    peer.create_session(RoomId::parse("twice").unwrap())
        .await
        .unwrap();

    peer.close().await.unwrap();
    peer.close().await.unwrap();

    assert_eq!(observer.states().await, vec![ConnectionState::Closed]);
}

#[tokio::test]
async fn test_closed_peer_stops_sending() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, _, _) = create_test_peer(&store);
    let room = RoomId::parse("quiet").unwrap();
    peer.create_session(room.clone()).await.unwrap();
    peer.close().await.unwrap();

    assert!(matches!(
        peer.start_as_initiator(None).await,
        Err(PeerError::Closed)
    ));
    assert!(matches!(
        peer.send_chat_message(ChatPayload::new("anyone?", "LunarWanderer1"))
            .await,
        Err(PeerError::Closed)
    ));
    assert!(peer.transport().read(&room).is_empty());
    assert!(peer.stats().await.is_none());
}

#[tokio::test]
async fn test_new_session_after_close() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, sessions, _) = create_test_peer(&store);

    peer.create_session(RoomId::parse("first").unwrap())
        .await
        .unwrap();
    peer.close().await.unwrap();

    peer.create_session(RoomId::parse("second").unwrap())
        .await
        .unwrap();
    assert_eq!(peer.state(), ConnectionState::Disconnected);
    assert_eq!(sessions.created(), 2);
    assert!(peer.stats().await.is_some());
}

#[tokio::test]
async fn test_close_after_session_reports_closed() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, sessions, observer) = create_test_peer(&store);
    let room = RoomId::parse("dropped").unwrap();

    peer.create_session(room.clone()).await.unwrap();
    peer.start_as_initiator(None).await.unwrap();

    let probe = sessions.latest();
    probe
        .emit(SessionEvent::StateChanged(ConnectionState::Closed))
        .await;
    peer.drain_session_events().await;
    assert_eq!(peer.state(), ConnectionState::Closed);

    peer.close().await.unwrap();

    assert!(probe.log().closed);
    assert!(probe.local_link().is_closed());
    assert!(peer.transport().read(&room).is_empty());
    assert!(peer.room().is_none());
    assert_eq!(
        observer.states().await,
        vec![ConnectionState::Connecting, ConnectionState::Closed]
    );
}
