//! Broadcast channel for audit events.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every successful
//! ledger mutation publishes a [`PoolEvent`] through the bus, and every
//! WebSocket audit stream subscribes to it.

use tokio::sync::broadcast;

use super::PoolEvent;

/// Broadcast bus for [`PoolEvent`]s.
///
/// When the ring buffer is full the oldest events are dropped for lagging
/// receivers; the ledger itself never waits on subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<PoolEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes an event and returns how many receivers got it.
    pub fn publish(&self, event: PoolEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Creates a receiver for all future events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<PoolEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{LedgerEvent, PoolId, PositionId};

    fn burned(pool_id: PoolId) -> PoolEvent {
        PoolEvent::new(
            pool_id,
            LedgerEvent::Burned {
                position_id: PositionId::new(3),
            },
        )
    }

    #[test]
    fn publish_without_receivers_returns_zero() {
        let bus = EventBus::new(16);
        assert_eq!(bus.publish(burned(PoolId::new())), 0);
    }

    #[test]
    fn zero_capacity_is_clamped() {
        let bus = EventBus::new(0);
        let _rx = bus.subscribe();
        assert_eq!(bus.publish(burned(PoolId::new())), 1);
    }

    #[tokio::test]
    async fn every_subscriber_receives_event() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let id = PoolId::new();
        assert_eq!(bus.publish(burned(id)), 2);

        let Ok(e1) = rx1.recv().await else {
            panic!("rx1 failed");
        };
        let Ok(e2) = rx2.recv().await else {
            panic!("rx2 failed");
        };
        assert_eq!(e1.pool_id(), id);
        assert_eq!(e2.event_type_str(), "burned");
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let bus = EventBus::new(16);
        let rx = bus.subscribe();
        assert_eq!(bus.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.receiver_count(), 0);
    }
}
