use crate::error::StreamTailError;
use crate::follow::{follow, gave_up};

use session_core::{ConnectionManager, ConnectionStatus, SessionConfig, SessionSnapshot};

use std::future::pending;
use std::net::TcpListener;
use std::time::Duration;

use tokio::time::timeout;

const TIMEOUT: Duration = Duration::from_secs(5);

fn disconnected(attempts: u32, max: u32) -> SessionSnapshot {
    SessionSnapshot {
        status: ConnectionStatus::Disconnected,
        last_error: Some(String::from("Connection refused")),
        reconnect_attempts: attempts,
        max_reconnect_attempts: max,
        ..SessionSnapshot::default()
    }
}

/// **VALUE**: Verifies when the tool decides the session has given up.
///
/// **WHY THIS MATTERS**: Exiting early abandons retries the session would still make;
/// exiting late leaves the tool hanging on a dead session.
///
/// **BUG THIS CATCHES**: Would catch giving up while connecting, while a retry is armed,
/// or ignoring `--no-reconnect`.
#[test]
fn given_snapshots_when_checking_gave_up_then_only_final_disconnects_count() {
    // GIVEN/WHEN/THEN: Connecting never counts
    let mut connecting = disconnected(3, 3);
    connecting.status = ConnectionStatus::Connecting;
    assert!(gave_up(&connecting, true).is_none());
    assert!(gave_up(&connecting, false).is_none());

    // AND: With reconnects on, only an exhausted session counts
    assert!(gave_up(&disconnected(1, 3), true).is_none());
    let mut armed = disconnected(3, 3);
    armed.reconnect_pending = true;
    assert!(gave_up(&armed, true).is_none());
    assert!(gave_up(&disconnected(3, 3), true).is_some());

    // AND: With reconnects off, any disconnect counts
    let Some(err) = gave_up(&disconnected(0, 3), false) else {
        panic!("Expected GaveUp without auto reconnect");
    };
    let StreamTailError::GaveUp { message, .. } = &err else {
        panic!("Expected GaveUp variant, got {err:?}");
    };
    assert!(message.contains("after 0 reconnect attempts"));
    assert!(message.contains("Connection refused"));
}

/// **VALUE**: Verifies following a session that already failed returns instead of waiting.
///
/// **WHY THIS MATTERS**: The status broadcast only reaches receivers that existed when it
/// was sent. A connection refused before the tool starts listening must still end the run.
///
/// **BUG THIS CATCHES**: Would catch `follow` relying only on status broadcasts and hanging
/// forever on a session that disconnected before it subscribed.
#[tokio::test]
async fn given_session_already_disconnected_when_followed_then_gives_up() {
    // GIVEN: A no-reconnect session pointed at a port nobody listens on
    let addr = TcpListener::bind("127.0.0.1:0")
        .and_then(|listener| listener.local_addr())
        .expect("Failed to reserve a port");
    let mut config = SessionConfig::default().with_origin(format!("http://{addr}"));
    config.auto_reconnect = false;
    let manager = ConnectionManager::start_ws(config, |_, _| {}).expect("Failed to start session");

    // AND: The disconnect has happened before anyone follows
    assert!(
        manager
            .wait_until(|s| s.status == ConnectionStatus::Disconnected, TIMEOUT)
            .await,
        "Session should fail to connect"
    );

    // WHEN: Following it with no shutdown signal
    let outcome = timeout(TIMEOUT, follow(&manager, false, pending()))
        .await
        .expect("follow should not wait for a broadcast that already happened");

    // THEN: The run ends with GaveUp
    assert!(matches!(outcome, Err(StreamTailError::GaveUp { .. })));
    manager.dispose().await.expect("Failed to dispose session");
}
