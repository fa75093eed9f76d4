//! Single-request admission rule.
//!
//! [`admit`] decides whether a requester may join an event and with which
//! initial status. It reads the event and its ledger but changes neither;
//! the caller must hold the event's ledger guard so that the decision and
//! the subsequent insert form one critical section.

use chrono::{DateTime, Utc};

use super::{Event, EventLedger, ParticipationRequest, RequestStatus, UserId};
use crate::error::{Conflict, GatewayError};

/// Builds the new request `requester_id` would get for `event`.
///
/// # Errors
///
/// In check order:
/// - [`Conflict::EventNotPublished`] unless the event is published.
/// - [`Conflict::OwnEvent`] if the requester is the initiator.
/// - [`Conflict::DuplicateRequest`] if a non-canceled request exists.
/// - [`Conflict::LimitReached`] if a limited event is full.
pub fn admit(
    event: &Event,
    ledger: &EventLedger,
    requester_id: UserId,
    now: DateTime<Utc>,
) -> Result<ParticipationRequest, GatewayError> {
    if !event.state.accepts_requests() {
        return Err(Conflict::EventNotPublished.into());
    }
    if requester_id == event.initiator_id {
        return Err(Conflict::OwnEvent.into());
    }
    if ledger.active_request_of(requester_id).is_some() {
        return Err(Conflict::DuplicateRequest.into());
    }
    if event.participant_limit > 0 && ledger.confirmed_count() >= event.participant_limit {
        return Err(Conflict::LimitReached.into());
    }

    let status = if event.auto_confirms() {
        RequestStatus::Confirmed
    } else {
        RequestStatus::Pending
    };
    Ok(ParticipationRequest::new(event.id, requester_id, status, now))
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{EventId, EventState};
    use chrono::Duration;

    pub(crate) fn published_event(limit: u32, moderation: bool) -> Event {
        let now = Utc::now();
        Event {
            id: EventId::new(),
            initiator_id: UserId::new(),
            title: "Rust meetup".to_string(),
            annotation: "Monthly gathering of local Rustaceans".to_string(),
            description: "Talks about async, lifetimes and everything in between".to_string(),
            state: EventState::Published,
            participant_limit: limit,
            request_moderation: moderation,
            created_on: now,
            published_at: Some(now),
            event_date: now + Duration::days(7),
        }
    }

    fn admit_into(event: &Event, ledger: &mut EventLedger) -> ParticipationRequest {
        let Ok(request) = admit(event, ledger, UserId::new(), Utc::now()) else {
            panic!("admission failed");
        };
        let Ok(()) = ledger.insert(request.clone()) else {
            panic!("insert failed");
        };
        request
    }

    #[test]
    fn moderated_limited_event_starts_pending() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        assert_eq!(admit_into(&event, &mut ledger).status, RequestStatus::Pending);
        assert_eq!(admit_into(&event, &mut ledger).status, RequestStatus::Pending);
    }

    #[test]
    fn unlimited_or_unmoderated_auto_confirms() {
        for event in [published_event(0, true), published_event(3, false)] {
            let mut ledger = EventLedger::new(event.id);
            assert_eq!(admit_into(&event, &mut ledger).status, RequestStatus::Confirmed);
        }
    }

    #[test]
    fn unpublished_event_is_refused() {
        let mut event = published_event(0, false);
        event.state = EventState::Pending;
        let ledger = EventLedger::new(event.id);
        let Err(GatewayError::Conflict(Conflict::EventNotPublished)) =
            admit(&event, &ledger, UserId::new(), Utc::now())
        else {
            panic!("expected event not published");
        };
    }

    #[test]
    fn initiator_cannot_join_own_event() {
        let event = published_event(0, false);
        let ledger = EventLedger::new(event.id);
        let Err(GatewayError::Conflict(Conflict::OwnEvent)) =
            admit(&event, &ledger, event.initiator_id, Utc::now())
        else {
            panic!("expected own event conflict");
        };
    }

    #[test]
    fn second_active_request_is_duplicate() {
        let event = published_event(0, false);
        let mut ledger = EventLedger::new(event.id);
        let first = admit_into(&event, &mut ledger);
        let Err(GatewayError::Conflict(Conflict::DuplicateRequest)) =
            admit(&event, &ledger, first.requester_id, Utc::now())
        else {
            panic!("expected duplicate");
        };
    }

    #[test]
    fn canceled_request_allows_a_new_one() {
        let event = published_event(0, false);
        let mut ledger = EventLedger::new(event.id);
        let first = admit_into(&event, &mut ledger);
        let Ok(canceled) = ledger.stage_cancel(first.id, first.requester_id) else {
            panic!("cancel failed");
        };
        ledger.commit(&[canceled]);
        assert!(admit(&event, &ledger, first.requester_id, Utc::now()).is_ok());
    }

    #[test]
    fn full_event_reports_limit_reached() {
        let event = published_event(1, false);
        let mut ledger = EventLedger::new(event.id);
        let _ = admit_into(&event, &mut ledger);
        let Err(GatewayError::Conflict(Conflict::LimitReached)) =
            admit(&event, &ledger, UserId::new(), Utc::now())
        else {
            panic!("expected limit reached");
        };
    }
}
