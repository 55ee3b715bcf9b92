//! Integration tests for parley-peer.
//!
//! Tests are organized by functionality:
//! - `signaling_tests` - mailbox send/poll, retention, storage backends
//! - `connection_tests` - offer/answer handshake, role guard, candidates, close
//! - `messaging_tests` - chat over the data channel and the signaling fallback
//! - `actor_tests` - peers driven through spawned tasks and handles

pub mod actor_tests;
pub mod messaging_tests;

use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use parley_peer::{MemoryStore, PeerConfig, PeerConnectionManager};

use crate::utils::{MockSessionFactory, TestPeerObserver};

/// Initialize tracing for tests (call once per test).
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Defaults with a poll interval short enough for tests.
pub fn test_config() -> PeerConfig {
    PeerConfig {
        poll_interval: Duration::from_millis(20),
        ..PeerConfig::default()
    }
}

/// Create a peer on `store` with a mock session factory and a recording observer.
pub fn create_test_peer(
    store: &MemoryStore,
) -> (PeerConnectionManager, MockSessionFactory, TestPeerObserver) {
    create_test_peer_with(store, MockSessionFactory::new())
}

pub fn create_test_peer_with(
    store: &MemoryStore,
    sessions: MockSessionFactory,
) -> (PeerConnectionManager, MockSessionFactory, TestPeerObserver) {
    let observer = TestPeerObserver::new();
    let manager = PeerConnectionManager::new(
        test_config(),
        Arc::new(store.clone()),
        Arc::new(sessions.clone()),
        Arc::new(observer.clone()),
    );
    (manager, sessions, observer)
}
