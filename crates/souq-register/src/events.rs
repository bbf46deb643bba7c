//! # Cache Invalidation Events
//!
//! A committed sale changes what every open view should display: recent
//! sales, stat cards, product stock levels. Rather than have the commit
//! workflow know about views, it publishes invalidations on a broadcast
//! channel and interested parties subscribe.
//!
//! ```text
//! Checkout::commit ──► InvalidationBus ──► stats view refetches
//!                                      ├─► product list refetches
//!                                      └─► sales history refetches
//! ```
//!
//! Publishing never fails and never blocks: a bus with no subscribers
//! drops the event, which is correct (nothing is displaying stale data).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

/// What class of cached data became stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Invalidation {
    /// Sales history and aggregates changed.
    Sales,
    /// Product stock levels changed.
    Products,
}

/// Broadcast bus for cache invalidation events.
///
/// Cheap to clone; all clones share the same channel.
#[derive(Debug, Clone)]
pub struct InvalidationBus {
    sender: broadcast::Sender<Invalidation>,
}

impl InvalidationBus {
    /// Creates a bus with the given buffer capacity.
    ///
    /// A slow subscriber that falls more than `capacity` events behind
    /// sees `RecvError::Lagged` and should refetch everything.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        InvalidationBus { sender }
    }

    /// Publishes an invalidation to all current subscribers.
    pub fn publish(&self, event: Invalidation) {
        // Err means no subscribers, which is fine
        let delivered = self.sender.send(event).unwrap_or(0);
        debug!(?event, subscribers = delivered, "Published invalidation");
    }

    /// Subscribes to invalidation events.
    pub fn subscribe(&self) -> broadcast::Receiver<Invalidation> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for InvalidationBus {
    fn default() -> Self {
        InvalidationBus::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_and_receive() {
        let bus = InvalidationBus::default();
        let mut rx = bus.subscribe();

        bus.publish(Invalidation::Sales);
        bus.publish(Invalidation::Products);

        assert_eq!(rx.recv().await.unwrap(), Invalidation::Sales);
        assert_eq!(rx.recv().await.unwrap(), Invalidation::Products);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_ok() {
        let bus = InvalidationBus::default();
        // must not panic or block
        bus.publish(Invalidation::Sales);
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_receive() {
        let bus = InvalidationBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(Invalidation::Products);

        assert_eq!(rx1.recv().await.unwrap(), Invalidation::Products);
        assert_eq!(rx2.recv().await.unwrap(), Invalidation::Products);
    }
}
