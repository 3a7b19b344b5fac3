//! Desired versus confirmed channel bookkeeping.
//!
//! Desired is the caller's intent and survives reconnects. Confirmed is what
//! the gateway has acknowledged in the current epoch. Subscribing is
//! conservative (confirmed only on ack); unsubscribing is optimistic (removed
//! from both sets immediately).

use models::{AckAction, Channel};

use std::collections::BTreeSet;

use log::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionTracker {
    desired: BTreeSet<Channel>,
    confirmed: BTreeSet<Channel>,
}

impl SubscriptionTracker {
    pub fn new(initial: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            desired: initial.into_iter().collect(),
            confirmed: BTreeSet::new(),
        }
    }

    pub fn desired(&self) -> &BTreeSet<Channel> {
        &self.desired
    }

    pub fn confirmed(&self) -> &BTreeSet<Channel> {
        &self.confirmed
    }

    /// Add channels to the desired set. Returns only the channels that were
    /// not already desired, in channel order.
    pub fn add_desired(&mut self, channels: impl IntoIterator<Item = Channel>) -> Vec<Channel> {
        let mut added: Vec<Channel> = channels
            .into_iter()
            .filter(|channel| self.desired.insert(*channel))
            .collect();
        added.sort();
        added
    }

    /// Drop channels from both sets. Returns the channels that were desired
    /// or confirmed before the call, in channel order.
    pub fn remove(&mut self, channels: impl IntoIterator<Item = Channel>) -> Vec<Channel> {
        let mut removed: Vec<Channel> = channels
            .into_iter()
            .filter(|channel| {
                let was_desired = self.desired.remove(channel);
                let was_confirmed = self.confirmed.remove(channel);
                was_desired || was_confirmed
            })
            .collect();
        removed.sort();
        removed
    }

    /// Apply a gateway acknowledgement to the confirmed set.
    pub fn apply_ack(&mut self, action: AckAction, channels: &[Channel]) {
        match action {
            AckAction::Subscribed => {
                for channel in channels {
                    if !self.desired.contains(channel) {
                        debug!("Gateway confirmed {channel} which is no longer desired");
                    }
                    self.confirmed.insert(*channel);
                }
            }
            AckAction::Unsubscribed => {
                for channel in channels {
                    self.confirmed.remove(channel);
                }
            }
        }
    }

    /// Everything desired, for the resubscribe sent on each open.
    pub fn resubscribe_set(&self) -> Vec<Channel> {
        self.desired.iter().copied().collect()
    }

    /// The epoch ended; nothing is confirmed anymore.
    pub fn clear_confirmed(&mut self) {
        self.confirmed.clear();
    }
}
