//! Event DTOs for create, edit and read operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{EventAction, EventId, EventPatch, EventState, NewEvent, UserId};
use crate::service::EventView;

/// Request body for `POST /users/{userId}/events`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewEventRequest {
    /// Short title (3–120 chars).
    pub title: String,
    /// Teaser text (20–2000 chars).
    pub annotation: String,
    /// Full description (20–7000 chars).
    pub description: String,
    /// When the event takes place; at least two hours ahead.
    pub event_date: DateTime<Utc>,
    /// Maximum confirmed participants; 0 (default) means unlimited.
    #[serde(default)]
    pub participant_limit: u32,
    /// Whether requests need initiator confirmation. Defaults to `true`.
    #[serde(default = "default_moderation")]
    pub request_moderation: bool,
}

fn default_moderation() -> bool {
    true
}

impl From<NewEventRequest> for NewEvent {
    fn from(req: NewEventRequest) -> Self {
        Self {
            title: req.title,
            annotation: req.annotation,
            description: req.description,
            event_date: req.event_date,
            participant_limit: req.participant_limit,
            request_moderation: req.request_moderation,
        }
    }
}

/// Request body for event edits by the initiator or an administrator.
///
/// Initiators may send `SEND_TO_REVIEW` or `CANCEL_REVIEW`; administrators
/// may send `PUBLISH_EVENT` or `REJECT_EVENT`.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New annotation.
    #[serde(default)]
    pub annotation: Option<String>,
    /// New description.
    #[serde(default)]
    pub description: Option<String>,
    /// New event date.
    #[serde(default)]
    pub event_date: Option<DateTime<Utc>>,
    /// New participant limit.
    #[serde(default)]
    pub participant_limit: Option<u32>,
    /// New moderation flag.
    #[serde(default)]
    pub request_moderation: Option<bool>,
    /// Lifecycle action.
    #[serde(default)]
    pub state_action: Option<EventAction>,
}

impl From<UpdateEventRequest> for EventPatch {
    fn from(req: UpdateEventRequest) -> Self {
        Self {
            title: req.title,
            annotation: req.annotation,
            description: req.description,
            event_date: req.event_date,
            participant_limit: req.participant_limit,
            request_moderation: req.request_moderation,
            state_action: req.state_action,
        }
    }
}

/// An event as returned by the API.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    /// Event identifier.
    pub id: EventId,
    /// Creator of the event.
    pub initiator: UserId,
    /// Short title.
    pub title: String,
    /// Teaser text.
    pub annotation: String,
    /// Full description.
    pub description: String,
    /// Publication state.
    pub state: EventState,
    /// Maximum confirmed participants; 0 means unlimited.
    pub participant_limit: u32,
    /// Whether requests need initiator confirmation.
    pub request_moderation: bool,
    /// Number of confirmed participation requests.
    pub confirmed_requests: u32,
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Publication timestamp, once published.
    pub published_on: Option<DateTime<Utc>>,
    /// When the event takes place.
    pub event_date: DateTime<Utc>,
}

impl From<EventView> for EventDto {
    fn from(view: EventView) -> Self {
        let event = view.event;
        Self {
            id: event.id,
            initiator: event.initiator_id,
            title: event.title,
            annotation: event.annotation,
            description: event.description,
            state: event.state,
            participant_limit: event.participant_limit,
            request_moderation: event.request_moderation,
            confirmed_requests: view.confirmed_requests,
            created_on: event.created_on,
            published_on: event.published_at,
            event_date: event.event_date,
        }
    }
}
