use crate::session_tests::helpers::TIMEOUT;

use session_core::transport::{Connector, TransportEvent, WsConnector};

use tokio::net::TcpListener;
use tokio::time::timeout;
use url::Url;

/// **VALUE**: Verifies `wss` endpoints get as far as a TLS handshake.
///
/// **WHY THIS MATTERS**: Gateways served over `https` are reached at `wss://`. If the
/// WebSocket client is built without a TLS backend every such connect fails before a
/// single byte is sent, and the session just retries until it gives up.
///
/// **BUG THIS CATCHES**: Would catch the tungstenite TLS feature being dropped from the
/// workspace manifest.
#[tokio::test]
async fn given_wss_url_when_opened_then_tls_handshake_is_attempted() {
    // GIVEN: A plain TCP listener that hangs up on whoever connects
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind listener");
    let addr = listener.local_addr().expect("Listener has no address");
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("No connection accepted");
        drop(stream);
    });

    // WHEN: Opening a wss transport against it
    let url = Url::parse(&format!("wss://{addr}/ws")).expect("Invalid url");
    let mut transport = WsConnector.open(&url);
    let event = timeout(TIMEOUT, transport.next_event())
        .await
        .expect("No transport event within timeout");

    // THEN: The connection reached the listener and failed in the handshake
    timeout(TIMEOUT, server)
        .await
        .expect("Listener never saw a connection")
        .expect("Listener task panicked");
    match event {
        Some(TransportEvent::Error(message)) => {
            assert!(
                !message.contains("TLS support not compiled in"),
                "Client was built without TLS: {message}"
            );
        }
        other => panic!("Expected a handshake error, got {other:?}"),
    }

    // AND: The failure is followed by a close
    let closed = timeout(TIMEOUT, transport.next_event())
        .await
        .expect("No close within timeout");
    assert_eq!(closed, Some(TransportEvent::Closed));
}
