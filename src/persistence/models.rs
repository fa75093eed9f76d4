//! Database row shapes and their conversion into domain records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Event, EventId, EventState, ParticipationRequest, RequestId, RequestStatus, User, UserId,
};
use crate::error::GatewayError;

/// A row of the `users` table.
pub type UserRow = (Uuid, String, String, DateTime<Utc>);

/// A row of the `events` table.
pub type EventRow = (
    Uuid,
    Uuid,
    String,
    String,
    String,
    String,
    i64,
    bool,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    DateTime<Utc>,
);

/// A row of the `participation_requests` table.
pub type RequestRow = (Uuid, Uuid, Uuid, String, DateTime<Utc>);

/// Converts a `users` row.
#[must_use]
pub fn user_from_row((id, name, email, registered_at): UserRow) -> User {
    User {
        id: UserId::from_uuid(id),
        name,
        email,
        registered_at,
    }
}

/// Converts an `events` row.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on an unknown state or a
/// negative / oversized participant limit.
pub fn event_from_row(row: EventRow) -> Result<Event, GatewayError> {
    let (
        id,
        initiator_id,
        title,
        annotation,
        description,
        state,
        participant_limit,
        request_moderation,
        created_on,
        published_at,
        event_date,
    ) = row;

    Ok(Event {
        id: EventId::from_uuid(id),
        initiator_id: UserId::from_uuid(initiator_id),
        title,
        annotation,
        description,
        state: parse_event_state(&state)?,
        participant_limit: u32::try_from(participant_limit).map_err(|_| {
            GatewayError::PersistenceError(format!(
                "event {id} has invalid participant_limit {participant_limit}"
            ))
        })?,
        request_moderation,
        created_on,
        published_at,
        event_date,
    })
}

/// Converts a `participation_requests` row.
///
/// # Errors
///
/// Returns [`GatewayError::PersistenceError`] on an unknown status.
pub fn request_from_row(
    (id, event_id, requester_id, status, created_at): RequestRow,
) -> Result<ParticipationRequest, GatewayError> {
    Ok(ParticipationRequest {
        id: RequestId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        requester_id: UserId::from_uuid(requester_id),
        status: parse_request_status(&status)?,
        created_at,
    })
}

fn parse_event_state(raw: &str) -> Result<EventState, GatewayError> {
    match raw {
        "PENDING" => Ok(EventState::Pending),
        "PUBLISHED" => Ok(EventState::Published),
        "CANCELED" => Ok(EventState::Canceled),
        other => Err(GatewayError::PersistenceError(format!(
            "unknown event state {other}"
        ))),
    }
}

fn parse_request_status(raw: &str) -> Result<RequestStatus, GatewayError> {
    match raw {
        "PENDING" => Ok(RequestStatus::Pending),
        "CONFIRMED" => Ok(RequestStatus::Confirmed),
        "REJECTED" => Ok(RequestStatus::Rejected),
        "CANCELED" => Ok(RequestStatus::Canceled),
        other => Err(GatewayError::PersistenceError(format!(
            "unknown request status {other}"
        ))),
    }
}
