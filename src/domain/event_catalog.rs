//! Concurrent event storage with per-event locking.
//!
//! [`EventCatalog`] stores every event in a `HashMap` where each record is
//! individually protected by a [`tokio::sync::RwLock`]. Admission paths
//! only read records; lifecycle edits take the write lock, always while
//! already holding the event's ledger guard from
//! [`super::RequestStore`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Event, EventId, UserId};
use crate::error::GatewayError;

/// Authoritative store of [`Event`] records.
///
/// # Concurrency
///
/// - Multiple readers may inspect the same event concurrently.
/// - Writes to different events are concurrent.
/// - Writes to the same event are serialized.
#[derive(Debug, Default)]
pub struct EventCatalog {
    events: RwLock<HashMap<EventId, Arc<RwLock<Event>>>>,
}

impl EventCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a new event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] if an event with the same
    /// ID already exists (should never happen with UUID v4).
    pub async fn insert(&self, event: Event) -> Result<EventId, GatewayError> {
        let event_id = event.id;
        let mut map = self.events.write().await;
        if map.contains_key(&event_id) {
            return Err(GatewayError::InvalidRequest(format!(
                "event {event_id} already exists"
            )));
        }
        map.insert(event_id, Arc::new(RwLock::new(event)));
        Ok(event_id)
    }

    /// Returns the lock guarding one event record.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if no event with the given
    /// ID exists.
    pub async fn get(&self, event_id: EventId) -> Result<Arc<RwLock<Event>>, GatewayError> {
        let map = self.events.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or(GatewayError::EventNotFound(*event_id.as_uuid()))
    }

    /// Returns a copy of the event as it is right now.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if no event with the given
    /// ID exists.
    pub async fn snapshot(&self, event_id: EventId) -> Result<Event, GatewayError> {
        let record = self.get(event_id).await?;
        let event = record.read().await.clone();
        Ok(event)
    }

    /// Returns all events created by `initiator_id`, newest first.
    pub async fn list_by_initiator(&self, initiator_id: UserId) -> Vec<Event> {
        let map = self.events.read().await;
        let mut events = Vec::new();
        for record in map.values() {
            let event = record.read().await;
            if event.initiator_id == initiator_id {
                events.push(event.clone());
            }
        }
        events.sort_by(|a, b| b.created_on.cmp(&a.created_on));
        events
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::admission::tests::published_event;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn insert_and_snapshot() {
        let catalog = EventCatalog::new();
        let event = published_event(3, true);
        let id = event.id;

        assert_ok!(catalog.insert(event.clone()).await);
        let Ok(fetched) = catalog.snapshot(id).await else {
            panic!("event not found");
        };
        assert_eq!(fetched, event);
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let catalog = EventCatalog::new();
        let event = published_event(3, true);
        assert_ok!(catalog.insert(event.clone()).await);
        assert_err!(catalog.insert(event).await);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_error() {
        let catalog = EventCatalog::new();
        let Err(GatewayError::EventNotFound(_)) = catalog.get(EventId::new()).await else {
            panic!("expected event not found");
        };
    }

    #[tokio::test]
    async fn list_filters_by_initiator() {
        let catalog = EventCatalog::new();
        let mine = published_event(0, false);
        let initiator = mine.initiator_id;
        let _ = catalog.insert(mine).await;
        let _ = catalog.insert(published_event(0, false)).await;

        assert_eq!(catalog.list_by_initiator(initiator).await.len(), 1);
        assert!(catalog.list_by_initiator(UserId::new()).await.is_empty());
    }
}
