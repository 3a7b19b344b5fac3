use crate::session_tests::gateway::{TestGateway, unused_addr};
use crate::session_tests::helpers::{TIMEOUT, eventually, fast_config, recording_handler};

use models::ClientEnvelope;
use session_core::{Channel, ConnectionManager, ConnectionStatus};

use std::collections::BTreeSet;

use serde_json::json;
use tokio::time::timeout;

/// **VALUE**: Verifies the full subscribe/ack cycle against a real WebSocket gateway.
///
/// **WHY THIS MATTERS**: This is the path every consumer takes on startup. Unit tests use
/// an in-memory transport; this proves the tungstenite connector and the codec agree with
/// a real socket.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - The endpoint path or scheme is wrong and the handshake fails
/// - Subscribe frames are sent before the socket opens
/// - Acks are not applied to the confirmed set
/// - Unsubscribe is not forwarded
#[tokio::test]
async fn given_gateway_when_session_started_then_channels_confirmed_by_ack() {
    // GIVEN: A gateway and a session wanting chat
    let gateway = TestGateway::start().await;
    let (_received, handler) = recording_handler();
    let manager =
        ConnectionManager::start_ws(fast_config(&gateway.origin(), &[Channel::Chat]), handler)
            .expect("Failed to start session");

    // WHEN: The session connects
    assert!(
        manager
            .wait_until(|s| s.subscribed_channels.contains(&Channel::Chat), TIMEOUT)
            .await,
        "Chat should be confirmed"
    );
    assert!(manager.is_connected());

    // WHEN: Subscribing to workers and leaving chat
    manager.subscribe([Channel::Workers]).await.unwrap();
    manager.unsubscribe([Channel::Chat]).await.unwrap();

    // THEN: Confirmed set settles on workers
    assert!(
        manager
            .wait_until(
                |s| s.subscribed_channels == BTreeSet::from([Channel::Workers]),
                TIMEOUT
            )
            .await
    );

    // AND: The gateway saw exactly the minimal requests, in order
    assert!(eventually(|| gateway.received().len() == 3).await);
    assert_eq!(
        gateway.received(),
        vec![
            ClientEnvelope::Subscribe { channels: vec![Channel::Chat] },
            ClientEnvelope::Subscribe { channels: vec![Channel::Workers] },
            ClientEnvelope::Unsubscribe { channels: vec![Channel::Chat] },
        ]
    );

    manager.dispose().await.unwrap();
}

/// **VALUE**: Verifies events flow to the handler in order and bad frames are skipped.
///
/// **WHY THIS MATTERS**: A single garbage frame from a misbehaving gateway must not stall
/// or kill the stream.
///
/// **BUG THIS CATCHES**: Would catch dispatch stopping after a decode failure, or decode
/// failures surfacing as a status change.
#[tokio::test]
async fn given_connected_when_gateway_pushes_events_then_dispatched_in_order() {
    // GIVEN: A connected session
    let gateway = TestGateway::start().await;
    let (received, handler) = recording_handler();
    let manager =
        ConnectionManager::start_ws(fast_config(&gateway.origin(), &[Channel::Chat]), handler)
            .unwrap();
    assert!(manager.wait_for_status(ConnectionStatus::Connected, TIMEOUT).await);

    // WHEN: The gateway pushes an event, garbage, then another event
    gateway.push(json!({ "type": "event", "channel": "chat", "data": { "seq": 1 } }));
    gateway.push_raw("{ this is not json");
    gateway.push(json!({ "type": "event", "channel": "orchestrator", "data": { "seq": 2 } }));

    // THEN: Both events arrive, in order, and the session is unaffected
    assert!(eventually(|| received.lock().unwrap().len() == 2).await);
    assert_eq!(
        received.lock().unwrap().clone(),
        vec![
            (Channel::Chat, json!({ "seq": 1 })),
            (Channel::Orchestrator, json!({ "seq": 2 })),
        ]
    );
    assert_eq!(manager.status(), ConnectionStatus::Connected);
    assert_eq!(manager.last_error(), None);

    manager.dispose().await.unwrap();
}

/// **VALUE**: Verifies a server-side drop leads to a reconnect and a fresh subscribe.
///
/// **WHY THIS MATTERS**: Gateways restart during deploys; clients must come back on their
/// own with the same channels.
///
/// **BUG THIS CATCHES**: Would catch if:
/// - A close frame is not reported as a close
/// - The reconnect timer is never armed
/// - The desired set is not resent on the new connection
#[tokio::test]
async fn given_gateway_drops_connection_when_reconnected_then_resubscribes() {
    // GIVEN: A session with chat confirmed
    let gateway = TestGateway::start().await;
    let (_received, handler) = recording_handler();
    let manager =
        ConnectionManager::start_ws(fast_config(&gateway.origin(), &[Channel::Chat]), handler)
            .unwrap();
    assert!(
        manager
            .wait_until(|s| !s.subscribed_channels.is_empty(), TIMEOUT)
            .await
    );
    let mut statuses = manager.status_changes();

    // WHEN: The gateway drops every connection
    gateway.drop_connections();

    // THEN: The session reports the drop and reconnects
    let dropped = timeout(TIMEOUT, statuses.recv()).await.unwrap().unwrap();
    assert_eq!(dropped, ConnectionStatus::Disconnected);
    assert!(eventually(|| gateway.accepted() == 2).await);

    // AND: Chat is confirmed again on the new connection
    assert!(
        manager
            .wait_until(
                |s| s.is_connected() && s.subscribed_channels.contains(&Channel::Chat),
                TIMEOUT
            )
            .await
    );
    let subscribes = gateway
        .received()
        .into_iter()
        .filter(|e| matches!(e, ClientEnvelope::Subscribe { .. }))
        .count();
    assert_eq!(subscribes, 2);
    assert_eq!(manager.snapshot().reconnect_attempts, 0);

    manager.dispose().await.unwrap();
}

/// **VALUE**: Verifies heartbeat pings reach the gateway and pongs are tolerated.
///
/// **WHY THIS MATTERS**: Idle proxies close silent sockets.
///
/// **BUG THIS CATCHES**: Would catch pings not being written to the socket, or pongs
/// being treated as malformed.
#[tokio::test]
async fn given_short_heartbeat_when_idle_then_gateway_receives_pings() {
    // GIVEN: A 50ms heartbeat
    let gateway = TestGateway::start().await;
    let mut config = fast_config(&gateway.origin(), &[]);
    config.heartbeat_interval_ms = 50;
    let manager = ConnectionManager::start_ws(config, |_, _| {}).unwrap();

    // WHEN: Left idle
    assert!(manager.wait_for_status(ConnectionStatus::Connected, TIMEOUT).await);

    // THEN: Several pings arrive and the session stays healthy
    assert!(
        eventually(|| {
            gateway
                .received()
                .iter()
                .filter(|e| **e == ClientEnvelope::Ping)
                .count()
                >= 3
        })
        .await
    );
    assert_eq!(manager.status(), ConnectionStatus::Connected);
    assert_eq!(manager.last_error(), None);

    manager.dispose().await.unwrap();
}

/// **VALUE**: Verifies an unreachable gateway exhausts retries, and `reconnect()` tries again.
///
/// **WHY THIS MATTERS**: A wrong origin must end in a clear, stable state instead of
/// retrying forever.
///
/// **BUG THIS CATCHES**: Would catch connection failures not counting as attempts, missing
/// error text, or `reconnect()` being refused once retries are exhausted.
#[tokio::test]
async fn given_unreachable_gateway_when_retries_exhausted_then_manual_reconnect_retries() {
    // GIVEN: Nothing listening, two retries allowed
    let addr = unused_addr().await;
    let mut config = fast_config(&format!("http://{addr}"), &[Channel::Workers]);
    config.max_reconnect_attempts = 2;
    let manager = ConnectionManager::start_ws(config, |_, _| {}).unwrap();

    // WHEN: Every attempt is refused
    assert!(manager.wait_until(|s| s.retries_exhausted(), TIMEOUT).await);

    // THEN: Disconnected with the failure recorded
    let snapshot = manager.snapshot();
    assert_eq!(snapshot.status, ConnectionStatus::Disconnected);
    assert_eq!(snapshot.reconnect_attempts, 2);
    assert!(snapshot.last_error.is_some());

    // WHEN: Reconnecting manually
    let mut statuses = manager.status_changes();
    manager.reconnect().await.unwrap();

    // THEN: A fresh attempt starts
    let next = timeout(TIMEOUT, statuses.recv()).await.unwrap().unwrap();
    assert_eq!(next, ConnectionStatus::Connecting);
    assert!(manager.wait_until(|s| s.retries_exhausted(), TIMEOUT).await);

    manager.dispose().await.unwrap();
}

/// **VALUE**: Verifies dispose closes the socket and nothing reconnects afterwards.
///
/// **WHY THIS MATTERS**: Disposed sessions must not keep server-side resources alive.
///
/// **BUG THIS CATCHES**: Would catch the socket task outliving the session, or the close
/// being treated as a drop that triggers a reconnect.
#[tokio::test]
async fn given_connected_when_disposed_then_gateway_connection_closes() {
    // GIVEN: A connected session
    let gateway = TestGateway::start().await;
    let manager =
        ConnectionManager::start_ws(fast_config(&gateway.origin(), &[Channel::Chat]), |_, _| {})
            .unwrap();
    assert!(manager.wait_for_status(ConnectionStatus::Connected, TIMEOUT).await);
    assert!(eventually(|| gateway.active() == 1).await);

    // WHEN: Disposed
    manager.dispose().await.unwrap();

    // THEN: The gateway sees the close and no new connection
    assert!(eventually(|| gateway.active() == 0).await);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(gateway.accepted(), 1);
}
