//! Watch a running session until it gives up or the user stops it.

use crate::error::StreamTailError;

use session_core::{ConnectionManager, ConnectionStatus, SessionSnapshot};

use common::ErrorLocation;

use std::future::Future;
use std::panic::Location;

use log::{info, warn};
use tokio::sync::broadcast::error::RecvError;

/// The error to exit with if `snapshot` shows a session that will not
/// reconnect on its own.
#[track_caller]
pub fn gave_up(snapshot: &SessionSnapshot, auto_reconnect: bool) -> Option<StreamTailError> {
    if snapshot.status != ConnectionStatus::Disconnected
        || (auto_reconnect && !snapshot.retries_exhausted())
    {
        return None;
    }

    Some(StreamTailError::GaveUp {
        message: format!(
            "Connection lost after {} reconnect attempts: {}",
            snapshot.reconnect_attempts,
            snapshot.last_error.clone().unwrap_or_default()
        ),
        location: ErrorLocation::from(Location::caller()),
    })
}

/// Log status changes until `shutdown` resolves or the session gives up.
///
/// The snapshot is checked once after subscribing, so a session that failed
/// before this was called is not waited on forever.
pub async fn follow<S>(
    manager: &ConnectionManager,
    auto_reconnect: bool,
    shutdown: S,
) -> Result<(), StreamTailError>
where
    S: Future<Output = std::io::Result<()>>,
{
    let mut statuses = manager.status_changes();
    if let Some(e) = gave_up(&manager.snapshot(), auto_reconnect) {
        return Err(e);
    }

    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            signal = &mut shutdown => {
                if let Err(e) = signal {
                    warn!("Failed to listen for Ctrl-C: {e}");
                }
                info!("Shutdown requested");
                return Ok(());
            }
            status = statuses.recv() => match status {
                Ok(ConnectionStatus::Error) => {
                    warn!("Connection error: {}", manager.last_error().unwrap_or_default());
                }
                Ok(status) => {
                    info!("Connection {status}");
                    if status == ConnectionStatus::Disconnected {
                        if let Some(e) = gave_up(&manager.snapshot(), auto_reconnect) {
                            return Err(e);
                        }
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Missed {skipped} status changes");
                    if let Some(e) = gave_up(&manager.snapshot(), auto_reconnect) {
                        return Err(e);
                    }
                }
                Err(RecvError::Closed) => return Ok(()),
            },
        }
    }
}
