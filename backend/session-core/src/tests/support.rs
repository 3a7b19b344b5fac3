// Shared fixtures for session unit tests: an in-memory connector and
// helpers for driving the actor under tokio's paused clock.

use crate::config::SessionConfig;
use crate::session::ConnectionManager;
use crate::transport::{Connector, InboundFrame, Transport, TransportEvent, TransportPeer, pair};

use models::{Channel, ClientEnvelope};

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use url::Url;

#[derive(Default)]
struct FakeConnectorState {
    peers: VecDeque<TransportPeer>,
    urls: Vec<Url>,
}

/// Connector that hands every opened transport's peer to the test.
#[derive(Clone, Default)]
pub(crate) struct FakeConnector {
    inner: Arc<Mutex<FakeConnectorState>>,
}

impl Connector for FakeConnector {
    fn open(&self, url: &Url) -> Transport {
        let (transport, peer) = pair();
        let mut state = self.inner.lock().unwrap();
        state.peers.push_back(peer);
        state.urls.push(url.clone());
        transport
    }
}

impl FakeConnector {
    pub(crate) fn open_count(&self) -> usize {
        self.inner.lock().unwrap().urls.len()
    }

    pub(crate) fn last_url(&self) -> Option<Url> {
        self.inner.lock().unwrap().urls.last().cloned()
    }

    /// Peer of the most recent transport; older unclaimed peers are discarded.
    pub(crate) fn take_peer(&self) -> TransportPeer {
        let mut state = self.inner.lock().unwrap();
        let peer = state.peers.pop_back().expect("No transport was opened");
        state.peers.clear();
        peer
    }
}

pub(crate) type Received = Arc<Mutex<Vec<(Channel, Value)>>>;

pub(crate) fn recording_handler() -> (Received, impl FnMut(Channel, Value) + Send + 'static) {
    let received: Received = Arc::default();
    let sink = Arc::clone(&received);
    (received, move |channel, data| {
        sink.lock().unwrap().push((channel, data));
    })
}

pub(crate) fn config_with(channels: &[Channel]) -> SessionConfig {
    SessionConfig::default().with_channels(channels.iter().copied())
}

/// Start a session on a fake connector and wait until its first transport exists.
pub(crate) async fn start_session(
    config: SessionConfig,
) -> (ConnectionManager, FakeConnector, TransportPeer, Received) {
    let connector = FakeConnector::default();
    let (received, handler) = recording_handler();
    let manager = ConnectionManager::start(config, connector.clone(), handler)
        .expect("Failed to start session");
    round_trip(&manager).await;
    let peer = connector.take_peer();
    (manager, connector, peer, received)
}

/// Start a session and complete the open handshake, discarding the initial subscribe.
pub(crate) async fn connected_session(
    config: SessionConfig,
) -> (ConnectionManager, FakeConnector, TransportPeer, Received) {
    let (manager, connector, mut peer, received) = start_session(config).await;
    peer.emit(TransportEvent::Opened);
    round_trip(&manager).await;
    peer.drain_outbound();
    (manager, connector, peer, received)
}

/// Wait until the actor has handled everything queued before this call.
pub(crate) async fn round_trip(manager: &ConnectionManager) {
    manager
        .subscribe(Vec::new())
        .await
        .expect("Session actor should be running");
}

/// Move the paused clock and let the actor react to any timer that fired.
pub(crate) async fn advance(manager: &ConnectionManager, millis: u64) {
    tokio::time::advance(Duration::from_millis(millis)).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
    round_trip(manager).await;
}

/// Same as `advance` for when the manager has already been disposed.
pub(crate) async fn advance_detached(millis: u64) {
    tokio::time::advance(Duration::from_millis(millis)).await;
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

pub(crate) fn text_frame(value: Value) -> TransportEvent {
    TransportEvent::Frame(InboundFrame::Text(value.to_string()))
}

pub(crate) fn sent(peer: &mut TransportPeer) -> Vec<ClientEnvelope> {
    peer.drain_outbound()
        .iter()
        .map(|frame| serde_json::from_str(frame).expect("Outbound frame should be a ClientEnvelope"))
        .collect()
}
