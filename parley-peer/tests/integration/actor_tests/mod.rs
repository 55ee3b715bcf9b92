mod test_peer_handles;
