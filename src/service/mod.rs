//! Service layer: business logic orchestration.
//!
//! [`EventService`] drives the event lifecycle, [`RequestService`] drives
//! participation admission and capacity allocation, and [`UserService`]
//! registers users. Every mutating method follows the same pattern: take
//! the event's ledger guard, compute the change with a pure domain rule,
//! journal it, commit it in memory, then emit notifications through the
//! [`crate::domain::EventBus`].

pub mod event_service;
pub mod request_service;
pub mod user_service;

pub use event_service::{EventService, EventView};
pub use request_service::{RequestService, StatusUpdate};
pub use user_service::UserService;

use std::sync::Arc;

use crate::domain::{EventCatalog, RequestStore, UserCatalog};

/// The in-memory stores shared by all services.
#[derive(Debug, Clone, Default)]
pub struct Stores {
    /// Registered users.
    pub users: Arc<UserCatalog>,
    /// Events and their lifecycle state.
    pub events: Arc<EventCatalog>,
    /// Participation requests, one ledger per event.
    pub requests: Arc<RequestStore>,
}

impl Stores {
    /// Creates empty stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
