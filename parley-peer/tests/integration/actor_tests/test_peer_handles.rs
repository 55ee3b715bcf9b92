use parley_core::{ChatPayload, ConnectionState, RoomId, SignalKind};
use parley_peer::{
    ChatRoute, LocalMedia, MediaTrack, MemoryStore, PeerError, SignalStore, SignalingTransport,
    TrackKind,
};

use crate::integration::{create_test_peer, create_test_peer_with, init_tracing};
use crate::utils::{MockSessionFactory, PeerEvent};

#[tokio::test]
async fn test_spawned_peers_connect_and_chat() {
    init_tracing();

    let store = MemoryStore::new();
    let (initiator, _, initiator_events) = create_test_peer(&store);
    let (responder, responder_sessions, responder_events) = create_test_peer(&store);
    let room = RoomId::parse("abc123").unwrap();

    let initiator = initiator.spawn();
    let responder = responder.spawn();

    initiator.create_session(room.clone()).await.unwrap();
    initiator.start_as_initiator(None).await.unwrap();

    // Joining answers the offer that is already waiting.
    responder.join(room.clone()).await.unwrap();
    assert_eq!(responder_sessions.latest().log().offers_accepted.len(), 1);

    assert!(
        initiator_events
            .wait_for_state(ConnectionState::Connected, 2000)
            .await
    );

    let payload = ChatPayload::new("hello from the other tab", "LunarPioneer21");
    let route = responder.send_chat_message(payload.clone()).await.unwrap();
    assert_eq!(route, ChatRoute::Signaling);
    assert!(
        initiator_events
            .wait_for(|e| *e == PeerEvent::Chat(payload.clone()), 2000)
            .await
    );

    assert!(initiator.stats().await.unwrap().is_some());

    initiator.close().await.unwrap();
    initiator.close().await.unwrap();
    responder.close().await.unwrap();

    assert!(
        responder_events
            .wait_for_state(ConnectionState::Closed, 1000)
            .await
    );
    assert!(
        store
            .get(&SignalingTransport::mailbox_key(&room))
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_media_failure_is_reported_not_fatal() {
    init_tracing();

    let store = MemoryStore::new();
    let (peer, _, observer) = create_test_peer_with(&store, MockSessionFactory::without_media());
    let room = RoomId::parse("camera").unwrap();
    let peer = peer.spawn();

    let media = LocalMedia {
        stream_id: "local".to_owned(),
        tracks: vec![MediaTrack {
            id: "cam0".to_owned(),
            kind: TrackKind::Video,
        }],
    };

    peer.create_session(room.clone()).await.unwrap();
    peer.start_as_initiator(Some(media)).await.unwrap();

    let errors = observer.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("camera is busy"));

    let kinds: Vec<SignalKind> = SignalingTransport::new(
        std::sync::Arc::new(store.clone()),
        Default::default(),
    )
    .read(&room)
    .iter()
    .map(|m| m.kind())
    .collect();
    assert_eq!(kinds, vec![SignalKind::Offer]);
}

#[tokio::test]
async fn test_handle_rejects_commands_after_close() {
    init_tracing();

    let store = MemoryStore::new();
    let (peer, _, _) = create_test_peer(&store);
    let handle = peer.spawn();
    assert!(handle.is_running());

    handle
        .create_session(RoomId::parse("gone").unwrap())
        .await
        .unwrap();
    handle.close().await.unwrap();

    assert!(matches!(
        handle.start_as_initiator(None).await,
        Err(PeerError::Closed)
    ));
}
