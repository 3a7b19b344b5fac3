use crate::subscription::SubscriptionTracker;

use models::{AckAction, Channel};

use std::collections::BTreeSet;

fn set(channels: &[Channel]) -> BTreeSet<Channel> {
    channels.iter().copied().collect()
}

/// **VALUE**: Verifies `add_desired` reports only channels that were not yet desired.
///
/// **WHY THIS MATTERS**: The result is exactly what gets sent to the gateway.
///
/// **BUG THIS CATCHES**: Would catch duplicates or already-desired channels being returned.
#[test]
fn given_existing_desired_when_adding_then_returns_only_new_sorted() {
    let mut tracker = SubscriptionTracker::new([Channel::Chat]);

    let added = tracker.add_desired([Channel::Workers, Channel::Chat, Channel::Orchestrator, Channel::Workers]);

    assert_eq!(added, vec![Channel::Orchestrator, Channel::Workers]);
    assert_eq!(tracker.desired(), &set(&Channel::ALL));
    assert!(tracker.confirmed().is_empty(), "Adding never confirms");
}

/// **VALUE**: Verifies confirmation is driven by acks and removal is immediate.
///
/// **WHY THIS MATTERS**: Subscribe waits for the gateway; unsubscribe does not.
///
/// **BUG THIS CATCHES**: Would catch removal leaving confirmed entries behind, or an
/// unsubscribed ack touching the desired set.
#[test]
fn given_acks_and_removals_when_applied_then_sets_follow_rules() {
    // GIVEN: Chat and workers desired and confirmed
    let mut tracker = SubscriptionTracker::new([Channel::Chat, Channel::Workers]);
    tracker.apply_ack(AckAction::Subscribed, &[Channel::Chat, Channel::Workers]);
    assert_eq!(tracker.confirmed(), &set(&[Channel::Chat, Channel::Workers]));

    // WHEN: Removing workers and an unknown channel
    let removed = tracker.remove([Channel::Orchestrator, Channel::Workers]);

    // THEN: Only workers is reported, gone from both sets
    assert_eq!(removed, vec![Channel::Workers]);
    assert_eq!(tracker.desired(), &set(&[Channel::Chat]));
    assert_eq!(tracker.confirmed(), &set(&[Channel::Chat]));

    // WHEN: Gateway acks an unsubscribe of chat
    tracker.apply_ack(AckAction::Unsubscribed, &[Channel::Chat]);

    // THEN: Unconfirmed, but still desired for the next open
    assert!(tracker.confirmed().is_empty());
    assert_eq!(tracker.resubscribe_set(), vec![Channel::Chat]);
}

/// **VALUE**: Verifies a subscribed ack for a channel no longer desired is still recorded.
///
/// **WHY THIS MATTERS**: The confirmed set reflects what the gateway says it sends, so the
/// caller can see the stray subscription.
///
/// **BUG THIS CATCHES**: Would catch acks being filtered against the desired set.
#[test]
fn given_undesired_channel_when_acked_then_confirmed_anyway() {
    let mut tracker = SubscriptionTracker::new([]);

    tracker.apply_ack(AckAction::Subscribed, &[Channel::Orchestrator]);

    assert_eq!(tracker.confirmed(), &set(&[Channel::Orchestrator]));
    assert!(tracker.desired().is_empty());
}

/// **VALUE**: Verifies clearing confirmed keeps the desired set for reconnects.
///
/// **WHY THIS MATTERS**: Desired is the caller's intent and must survive every epoch.
///
/// **BUG THIS CATCHES**: Would catch `clear_confirmed` wiping desired too.
#[test]
fn given_confirmed_channels_when_epoch_ends_then_desired_survives() {
    let mut tracker = SubscriptionTracker::new([Channel::Workers, Channel::Chat]);
    tracker.apply_ack(AckAction::Subscribed, &[Channel::Chat]);

    tracker.clear_confirmed();

    assert!(tracker.confirmed().is_empty());
    assert_eq!(tracker.resubscribe_set(), vec![Channel::Chat, Channel::Workers]);
}
