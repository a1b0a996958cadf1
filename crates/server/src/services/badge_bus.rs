//! Cart badge broadcast.
//!
//! Cart-mutation call sites publish a [`BadgeUpdate`] on the [`BadgeBus`];
//! every [`BadgeListener`] currently subscribed receives it and merges it
//! into the badge it is displaying. Call sites never need a reference to the
//! listeners.
//!
//! Delivery is fire-and-forget and at-most-once: updates published before a
//! listener subscribes are never seen by it, and a listener that falls more
//! than the channel capacity behind skips the oldest updates. There is no
//! replay.

use tokio::sync::broadcast::{self, error::RecvError};

use group_order_core::{Badge, BadgeUpdate, CartId};

/// Topic name badge updates are published under (used as the SSE event name).
pub const BADGE_TOPIC: &str = "cart-badge-updated";

/// Process-wide typed channel for badge updates.
#[derive(Clone)]
pub struct BadgeBus {
    tx: broadcast::Sender<BadgeUpdate>,
}

impl BadgeBus {
    /// Create a bus buffering up to `capacity` updates per listener.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; configuration rejects that value.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an update to every subscribed listener.
    ///
    /// Returns how many listeners the update was queued for. Having no
    /// listeners is not an error.
    pub fn publish(&self, update: BadgeUpdate) -> usize {
        let delivered = self.tx.send(update).unwrap_or(0);
        tracing::debug!(topic = BADGE_TOPIC, delivered, "Badge update published");
        delivered
    }

    /// Number of currently subscribed listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscription state of a [`BadgeListener`].
#[derive(Debug)]
enum ListenerState {
    Idle,
    Subscribed(broadcast::Receiver<BadgeUpdate>),
}

/// Display-side consumer of badge updates.
///
/// Holds the badge snapshot being displayed. While subscribed, each update
/// received is merged into the snapshot; fields the update leaves out keep
/// their previous value. Dropping the listener unsubscribes it.
#[derive(Debug)]
pub struct BadgeListener {
    snapshot: Badge,
    scope: Option<CartId>,
    state: ListenerState,
}

impl BadgeListener {
    /// Create an idle listener displaying `initial`.
    #[must_use]
    pub fn new(initial: Badge) -> Self {
        Self {
            snapshot: initial,
            scope: None,
            state: ListenerState::Idle,
        }
    }

    /// Only accept updates for `cart_id` (and updates naming no cart).
    #[must_use]
    pub fn scoped_to(mut self, cart_id: Option<CartId>) -> Self {
        self.scope = cart_id;
        self
    }

    /// Attach to the bus. Re-subscribing replaces the previous subscription.
    pub fn subscribe(&mut self, bus: &BadgeBus) {
        self.state = ListenerState::Subscribed(bus.tx.subscribe());
    }

    /// Detach from the bus. Always succeeds, including when already idle.
    pub fn unsubscribe(&mut self) {
        self.state = ListenerState::Idle;
    }

    #[must_use]
    pub const fn is_subscribed(&self) -> bool {
        matches!(self.state, ListenerState::Subscribed(_))
    }

    /// The badge currently displayed.
    #[must_use]
    pub const fn snapshot(&self) -> &Badge {
        &self.snapshot
    }

    /// Wait for the next relevant update, merge it and return the new
    /// snapshot.
    ///
    /// Returns `None` when idle or once the bus has shut down; the listener
    /// is idle afterwards.
    pub async fn next(&mut self) -> Option<Badge> {
        loop {
            let ListenerState::Subscribed(rx) = &mut self.state else {
                return None;
            };

            match rx.recv().await {
                Ok(update) => {
                    if let Some(scope) = &self.scope
                        && update.is_for_other_cart(scope)
                    {
                        continue;
                    }
                    self.snapshot.apply(&update);
                    return Some(self.snapshot.clone());
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(
                        topic = BADGE_TOPIC,
                        skipped,
                        "Badge listener fell behind, dropping updates"
                    );
                }
                Err(RecvError::Closed) => {
                    self.state = ListenerState::Idle;
                    return None;
                }
            }
        }
    }
}
