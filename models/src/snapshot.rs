use crate::channel::Channel;
use crate::status::ConnectionStatus;

use std::collections::BTreeSet;

use serde::Serialize;

/// Point-in-time view of a session, published after every state change.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SessionSnapshot {
    pub status: ConnectionStatus,
    pub last_error: Option<String>,
    /// Channels the gateway has acknowledged.
    pub subscribed_channels: BTreeSet<Channel>,
    /// Channels the caller has asked for.
    pub desired_channels: BTreeSet<Channel>,
    pub reconnect_attempts: u32,
    pub max_reconnect_attempts: u32,
    /// A reconnect timer is armed; the session will try again on its own.
    pub reconnect_pending: bool,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.status.is_connected()
    }

    /// True once automatic reconnection has given up (or was switched off by
    /// an explicit disconnect) and only a manual reconnect will move the
    /// session again.
    pub fn retries_exhausted(&self) -> bool {
        self.status == ConnectionStatus::Disconnected
            && self.reconnect_attempts >= self.max_reconnect_attempts
            && !self.reconnect_pending
    }
}
