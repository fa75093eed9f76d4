//! Domain layer: records, lifecycles, admission rules and stores.
//!
//! Events and participation requests reference each other only by id.
//! [`EventCatalog`] owns events, [`RequestStore`] owns requests grouped
//! into one [`EventLedger`] per event, and [`UserCatalog`] answers user
//! existence. The admission rules in [`admission`] and [`allocation`] are
//! pure functions over those records.

pub mod admission;
pub mod admission_event;
pub mod allocation;
pub mod event;
pub mod event_bus;
pub mod event_catalog;
pub mod ids;
pub mod request;
pub mod request_store;
pub mod user_catalog;

pub use admission::admit;
pub use admission_event::AdmissionEvent;
pub use allocation::{AllocationPlan, allocate};
pub use event::{Editor, Event, EventAction, EventPatch, EventState, NewEvent};
pub use event_bus::EventBus;
pub use event_catalog::EventCatalog;
pub use ids::{EventId, RequestId, UserId};
pub use request::{ParticipationRequest, RequestStatus};
pub use request_store::{EventLedger, RequestStore};
pub use user_catalog::{User, UserCatalog};
