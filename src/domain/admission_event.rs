//! Domain notifications emitted after admission state changes.
//!
//! Every successful mutation publishes an [`AdmissionEvent`] through the
//! [`super::EventBus`]. WebSocket clients subscribe per event id.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{EventId, EventState, ParticipationRequest, RequestId, RequestStatus, UserId};

/// Notification about a participation request or an event lifecycle change.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum AdmissionEvent {
    /// A participation request was created.
    RequestCreated {
        /// Event the request targets.
        event_id: EventId,
        /// New request.
        request_id: RequestId,
        /// Requesting user.
        requester_id: UserId,
        /// Initial status (`PENDING` or `CONFIRMED`).
        status: RequestStatus,
        /// Creation timestamp.
        timestamp: DateTime<Utc>,
    },

    /// A request moved to a new status (confirm, reject, cascade, cancel).
    RequestStatusChanged {
        /// Event the request targets.
        event_id: EventId,
        /// Affected request.
        request_id: RequestId,
        /// Requesting user.
        requester_id: UserId,
        /// Status before the change.
        from: RequestStatus,
        /// Status after the change.
        to: RequestStatus,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },

    /// An event moved through its publication lifecycle.
    EventStateChanged {
        /// Affected event.
        event_id: EventId,
        /// State before the change.
        from: EventState,
        /// State after the change.
        to: EventState,
        /// Change timestamp.
        timestamp: DateTime<Utc>,
    },
}

impl AdmissionEvent {
    /// Builds a `RequestCreated` notification for `request`.
    #[must_use]
    pub fn created(request: &ParticipationRequest) -> Self {
        Self::RequestCreated {
            event_id: request.event_id,
            request_id: request.id,
            requester_id: request.requester_id,
            status: request.status,
            timestamp: Utc::now(),
        }
    }

    /// Builds a `RequestStatusChanged` notification for `request`, which
    /// already carries its new status.
    #[must_use]
    pub fn status_changed(request: &ParticipationRequest, from: RequestStatus) -> Self {
        Self::RequestStatusChanged {
            event_id: request.event_id,
            request_id: request.id,
            requester_id: request.requester_id,
            from,
            to: request.status,
            timestamp: Utc::now(),
        }
    }

    /// Returns the event ID associated with this notification.
    #[must_use]
    pub const fn event_id(&self) -> EventId {
        match self {
            Self::RequestCreated { event_id, .. }
            | Self::RequestStatusChanged { event_id, .. }
            | Self::EventStateChanged { event_id, .. } => *event_id,
        }
    }

    /// Returns the notification type as a static string slice.
    #[must_use]
    pub const fn event_type_str(&self) -> &'static str {
        match self {
            Self::RequestCreated { .. } => "request_created",
            Self::RequestStatusChanged { .. } => "request_status_changed",
            Self::EventStateChanged { .. } => "event_state_changed",
        }
    }
}
