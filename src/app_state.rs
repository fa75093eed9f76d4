//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::EventBus;
use crate::persistence::PostgresPersistence;
use crate::service::{EventService, RequestService, Stores, UserService};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Event lifecycle operations.
    pub event_service: Arc<EventService>,
    /// Participation admission and moderation.
    pub request_service: Arc<RequestService>,
    /// User registration.
    pub user_service: Arc<UserService>,
    /// Event bus for WebSocket subscriptions.
    pub event_bus: EventBus,
    /// Whether a PostgreSQL journal is attached.
    pub persistence_enabled: bool,
}

impl AppState {
    /// Wires the services over `stores`, journaling through `journal` when
    /// one is given.
    #[must_use]
    pub fn new(stores: Stores, event_bus: EventBus, journal: Option<PostgresPersistence>) -> Self {
        Self {
            persistence_enabled: journal.is_some(),
            event_service: Arc::new(EventService::new(
                stores.clone(),
                event_bus.clone(),
                journal.clone(),
            )),
            request_service: Arc::new(RequestService::new(
                stores.clone(),
                event_bus.clone(),
                journal.clone(),
            )),
            user_service: Arc::new(UserService::new(stores.users, journal)),
            event_bus,
        }
    }

    /// In-memory state with a fresh bus, as used by tests.
    #[must_use]
    pub fn in_memory(event_bus_capacity: usize) -> Self {
        Self::new(Stores::new(), EventBus::new(event_bus_capacity), None)
    }
}
