//! Shared setup for session integration tests.

use session_core::{Channel, SessionConfig};

use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::time::{Instant, sleep};

/// Upper bound for anything that should happen "soon" over localhost.
pub const TIMEOUT: Duration = Duration::from_secs(5);

/// Config with short timers so reconnect paths run in milliseconds.
pub fn fast_config(origin: &str, channels: &[Channel]) -> SessionConfig {
    let mut config = SessionConfig::default()
        .with_origin(origin)
        .with_channels(channels.iter().copied());
    config.reconnect_delay_ms = 50;
    config.max_reconnect_delay_ms = 200;
    config.heartbeat_interval_ms = 60_000;
    config
}

pub type Received = Arc<Mutex<Vec<(Channel, Value)>>>;

pub fn recording_handler() -> (Received, impl FnMut(Channel, Value) + Send + 'static) {
    let received: Received = Arc::default();
    let sink = Arc::clone(&received);
    (received, move |channel, data| {
        sink.lock().unwrap().push((channel, data));
    })
}

/// Poll `condition` until it holds or [`TIMEOUT`] elapses.
pub async fn eventually(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        sleep(Duration::from_millis(10)).await;
    }
    condition()
}
