//! Liveness pings while a connection is up.
//!
//! The scheduler only owns the timer; the session decides what a tick sends.
//! Pongs are not correlated with pings, so a silent peer is only noticed when
//! the transport itself reports the close.

use std::future::pending;
use std::time::Duration;

use log::trace;
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};

#[derive(Debug)]
pub struct HeartbeatScheduler {
    period: Duration,
    interval: Option<Interval>,
}

impl HeartbeatScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            interval: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking one period from now, replacing any running timer.
    pub fn start(&mut self) {
        let mut interval = interval_at(Instant::now() + self.period, self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        if self.interval.replace(interval).is_some() {
            trace!("Heartbeat restarted");
        }
    }

    pub fn stop(&mut self) {
        if self.interval.take().is_some() {
            trace!("Heartbeat stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }

    /// Resolves on the next tick. Never resolves while stopped.
    ///
    /// Cancel safe.
    pub async fn tick(&mut self) {
        match self.interval.as_mut() {
            Some(interval) => {
                interval.tick().await;
            }
            None => pending::<()>().await,
        }
    }
}
