use crate::{Channel, ConnectionStatus, SessionSnapshot};

use serde_json::json;

/// **VALUE**: Verifies `retries_exhausted()` only reports true when disconnected at the cap.
///
/// **WHY THIS MATTERS**: Exhausted retries are not an error variant; callers decide whether
/// to offer a manual reconnect purely from this derived flag.
///
/// **BUG THIS CATCHES**: Would catch the flag ignoring status (e.g. true while connecting).
#[test]
fn given_attempts_at_max_when_checking_then_exhausted_only_if_disconnected() {
    // GIVEN: A snapshot at the attempt cap
    let mut snapshot = SessionSnapshot {
        reconnect_attempts: 10,
        max_reconnect_attempts: 10,
        ..SessionSnapshot::default()
    };

    // WHEN/THEN: Disconnected is exhausted, Connecting is not
    assert!(snapshot.retries_exhausted());
    snapshot.status = ConnectionStatus::Connecting;
    assert!(!snapshot.retries_exhausted());

    // AND: Below the cap is never exhausted
    snapshot.status = ConnectionStatus::Disconnected;
    snapshot.reconnect_attempts = 9;
    assert!(!snapshot.retries_exhausted());
}

/// **VALUE**: Verifies an armed reconnect timer keeps the session from counting as exhausted.
///
/// **WHY THIS MATTERS**: The attempt counter reaches the cap when the final retry is
/// scheduled, not when it fails.
///
/// **BUG THIS CATCHES**: Would catch callers giving up while one retry is still to come.
#[test]
fn given_reconnect_pending_at_max_when_checking_then_not_exhausted() {
    // GIVEN: Disconnected at the cap with the last retry armed
    let mut snapshot = SessionSnapshot {
        reconnect_attempts: 3,
        max_reconnect_attempts: 3,
        reconnect_pending: true,
        ..SessionSnapshot::default()
    };

    // WHEN/THEN: Not exhausted until the timer is gone
    assert!(!snapshot.retries_exhausted());
    snapshot.reconnect_pending = false;
    assert!(snapshot.retries_exhausted());
}

/// **VALUE**: Verifies snapshots serialize with lowercase status and channel names.
///
/// **WHY THIS MATTERS**: The CLI prints snapshots as JSON for dashboards to scrape.
///
/// **BUG THIS CATCHES**: Would catch a status or channel serialization change.
#[test]
fn given_snapshot_when_serialized_then_uses_wire_names() {
    let snapshot = SessionSnapshot {
        status: ConnectionStatus::Connected,
        subscribed_channels: [Channel::Workers].into_iter().collect(),
        ..SessionSnapshot::default()
    };

    let json = serde_json::to_value(&snapshot).unwrap();

    assert_eq!(json["status"], json!("connected"));
    assert_eq!(json["subscribed_channels"], json!(["workers"]));
    assert!(snapshot.is_connected());
}
