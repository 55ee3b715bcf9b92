use parley_core::{ConnectionState, IceCandidate, RoomId, SignalBody, SignalMessage};
use parley_peer::MemoryStore;

use crate::integration::{create_test_peer, init_tracing};

#[tokio::test]
async fn test_invalid_candidate_does_not_fail_session() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, sessions, observer) = create_test_peer(&store);
    peer.create_session(RoomId::parse("ice").unwrap())
        .await
        .unwrap();

    peer.handle_candidate(IceCandidate::new("invalid candidate line"))
        .await;
    peer.handle_candidate(IceCandidate::new("candidate:1 1 udp 1 10.0.0.1 9 typ host"))
        .await;

    let accepted = sessions.latest().log().candidates;
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].candidate.starts_with("candidate:1"));

    assert_eq!(peer.state(), ConnectionState::Disconnected);
    assert!(observer.errors().await.is_empty());
}

#[tokio::test]
async fn test_candidates_before_offer_are_tolerated() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut responder, sessions, _) = create_test_peer(&store);
    let room = RoomId::parse("early").unwrap();

    // Candidates may arrive in any order relative to the offer.
    let transport = responder.transport().clone();
    transport
        .send(
            &room,
            &SignalMessage::new(SignalBody::IceCandidate {
                candidate: IceCandidate::new("candidate:early"),
            }),
        )
        .unwrap();
    transport
        .send(
            &room,
            &SignalMessage::new(SignalBody::IceCandidate {
                candidate: IceCandidate::new("invalid"),
            }),
        )
        .unwrap();

    responder.create_session(room).await.unwrap();
    assert_eq!(responder.poll_signals().await, 2);
    assert_eq!(sessions.latest().log().candidates.len(), 1);
}

#[tokio::test]
async fn test_candidate_without_session_is_dropped() {
    init_tracing();

    let store = MemoryStore::new();
    let (mut peer, sessions, _) = create_test_peer(&store);

    peer.handle_candidate(IceCandidate::new("candidate:orphan"))
        .await;
    assert_eq!(sessions.created(), 0);
}
