//! Broadcast channel for admission notifications.
//!
//! [`EventBus`] wraps a [`tokio::sync::broadcast`] channel. Every admission
//! mutation publishes an [`AdmissionEvent`] through the bus, and all
//! WebSocket connections subscribe to receive filtered notifications.

use tokio::sync::broadcast;

use super::AdmissionEvent;

/// Broadcast bus for [`AdmissionEvent`]s.
///
/// Backed by a `tokio::broadcast` channel with a configurable capacity
/// (default 10 000). When the ring buffer is full, the oldest notifications
/// are dropped for lagging receivers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AdmissionEvent>,
}

impl EventBus {
    /// Creates a new `EventBus` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes a notification to all subscribers.
    ///
    /// Returns the number of receivers that received it. With no active
    /// receivers the notification is dropped.
    pub fn publish(&self, event: AdmissionEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Publishes several notifications in order.
    pub fn publish_all(&self, events: impl IntoIterator<Item = AdmissionEvent>) {
        for event in events {
            let _ = self.publish(event);
        }
    }

    /// Creates a new receiver that will receive all future notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AdmissionEvent> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
