//! Reconnect delay policy and the single pending reconnect timer.

use std::future::pending;
use std::pin::Pin;
use std::time::Duration;

use log::trace;
use tokio::time::{Sleep, sleep};

/// Growth factor between consecutive attempts.
pub const BACKOFF_MULTIPLIER: f64 = 1.5;

/// `min(base * 1.5^(attempt - 1), cap)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
}

impl BackoffPolicy {
    pub fn new(base: Duration, cap: Duration) -> Self {
        Self { base, cap }
    }

    /// Delay before attempt `attempt` (1-indexed). Attempt 0 is treated as 1.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let base_millis = self.base.as_millis() as f64;
        let cap_millis = self.cap.as_millis() as f64;
        let millis = (base_millis * BACKOFF_MULTIPLIER.powi(exponent)).min(cap_millis);
        Duration::from_millis(millis as u64)
    }
}

/// Owns at most one pending reconnect timer.
#[derive(Debug)]
pub struct BackoffScheduler {
    policy: BackoffPolicy,
    pending: Option<Pin<Box<Sleep>>>,
}

impl BackoffScheduler {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            pending: None,
        }
    }

    pub fn policy(&self) -> BackoffPolicy {
        self.policy
    }

    /// Arm the timer for `attempt`, replacing any pending one. Returns the delay.
    pub fn schedule(&mut self, attempt: u32) -> Duration {
        let delay = self.policy.delay_for(attempt);
        if self.pending.replace(Box::pin(sleep(delay))).is_some() {
            trace!("Replaced pending reconnect timer");
        }
        delay
    }

    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            trace!("Cancelled pending reconnect timer");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolves when the pending timer elapses and disarms it. Never resolves
    /// while nothing is pending.
    ///
    /// Cancel safe.
    pub async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(timer) => {
                timer.as_mut().await;
                self.pending = None;
            }
            None => pending::<()>().await,
        }
    }
}
