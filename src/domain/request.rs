//! Participation request record and its status lifecycle.
//!
//! ```text
//! PENDING ──confirm──▶ CONFIRMED ─┐
//!    │                            │
//!    ├────reject───▶ REJECTED ────┼──cancel──▶ CANCELED
//!    │                            │
//!    └───────────cancel───────────┘
//! ```
//!
//! `CONFIRMED` and `REJECTED` accept no further status writes except a
//! cancellation by the requester; `CANCELED` absorbs repeated cancels.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, RequestId, UserId};
use crate::error::Conflict;

/// Status of a participation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    /// Awaiting initiator decision.
    Pending,
    /// Admitted; counts against the participant limit.
    Confirmed,
    /// Refused by the initiator or by capacity exhaustion.
    Rejected,
    /// Withdrawn by the requester.
    Canceled,
}

impl RequestStatus {
    /// Whether this request holds one unit of event capacity.
    #[must_use]
    pub const fn holds_capacity(self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// Whether this request blocks the same requester from asking again.
    #[must_use]
    pub const fn is_active(self) -> bool {
        !matches!(self, Self::Canceled)
    }

    /// Returns `self` moved to `target` by the initiator.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict::RequestNotPending`] unless the request is
    /// `PENDING` and `target` is `CONFIRMED` or `REJECTED`.
    pub const fn decide(self, target: Self) -> Result<Self, Conflict> {
        match (self, target) {
            (Self::Pending, Self::Confirmed | Self::Rejected) => Ok(target),
            _ => Err(Conflict::RequestNotPending),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Rejected => "REJECTED",
            Self::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

/// A user's request to take part in an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationRequest {
    /// Unique identifier.
    pub id: RequestId,
    /// Event the request targets.
    pub event_id: EventId,
    /// User asking to participate.
    pub requester_id: UserId,
    /// Current status.
    pub status: RequestStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl ParticipationRequest {
    /// Creates a request with a fresh id.
    #[must_use]
    pub fn new(
        event_id: EventId,
        requester_id: UserId,
        status: RequestStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RequestId::new(),
            event_id,
            requester_id,
            status,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_pending_can_be_decided() {
        use RequestStatus::*;

        assert_eq!(Pending.decide(Confirmed), Ok(Confirmed));
        assert_eq!(Pending.decide(Rejected), Ok(Rejected));
        for from in [Confirmed, Rejected, Canceled] {
            assert_eq!(from.decide(Confirmed), Err(Conflict::RequestNotPending));
            assert_eq!(from.decide(Rejected), Err(Conflict::RequestNotPending));
        }
    }

    #[test]
    fn initiator_cannot_decide_pending_or_canceled() {
        assert!(RequestStatus::Pending.decide(RequestStatus::Pending).is_err());
        assert!(RequestStatus::Pending.decide(RequestStatus::Canceled).is_err());
    }

    #[test]
    fn capacity_and_activity_flags() {
        assert!(RequestStatus::Confirmed.holds_capacity());
        assert!(!RequestStatus::Pending.holds_capacity());
        assert!(RequestStatus::Rejected.is_active());
        assert!(!RequestStatus::Canceled.is_active());
    }

    #[test]
    fn status_serializes_upper_case() {
        let json = serde_json::to_string(&RequestStatus::Confirmed).unwrap_or_default();
        assert_eq!(json, "\"CONFIRMED\"");
    }
}
