//! Explicit state owned by the session actor.

use crate::subscription::SubscriptionTracker;

use models::{ConnectionStatus, SessionSnapshot};

/// Consecutive reconnect attempts since the last successful open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryState {
    attempts: u32,
    max: u32,
}

impl RetryState {
    pub fn new(max: u32) -> Self {
        Self { attempts: 0, max }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max(&self) -> u32 {
        self.max
    }

    pub fn can_retry(&self) -> bool {
        self.attempts < self.max
    }

    /// Count the next attempt and return its 1-indexed number.
    pub fn advance(&mut self) -> u32 {
        self.attempts = self.attempts.saturating_add(1);
        self.attempts
    }

    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Pin the counter at the cap so nothing retries automatically.
    pub fn exhaust(&mut self) {
        self.attempts = self.max;
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub status: ConnectionStatus,
    pub last_error: Option<String>,
    pub tracker: SubscriptionTracker,
    pub retry: RetryState,
}

impl SessionState {
    pub fn new(tracker: SubscriptionTracker, retry: RetryState) -> Self {
        Self {
            status: ConnectionStatus::Disconnected,
            last_error: None,
            tracker,
            retry,
        }
    }

    pub fn snapshot(&self, reconnect_pending: bool) -> SessionSnapshot {
        SessionSnapshot {
            status: self.status,
            last_error: self.last_error.clone(),
            subscribed_channels: self.tracker.confirmed().clone(),
            desired_channels: self.tracker.desired().clone(),
            reconnect_attempts: self.retry.attempts(),
            max_reconnect_attempts: self.retry.max(),
            reconnect_pending,
        }
    }
}
