//! Batch confirm/reject with a hard capacity ceiling.
//!
//! [`allocate`] turns an initiator's batch decision into an
//! [`AllocationPlan`]: which requests become `CONFIRMED` and which become
//! `REJECTED`. It is a pure function of the event, the ledger snapshot and
//! the caller's input; the service applies the plan while still holding
//! the ledger guard the snapshot was taken under.
//!
//! Targeted requests are processed strictly in caller order. When the
//! remaining capacity reaches zero, every later target and every other
//! `PENDING` request of the event is rejected (cascading rejection).

use std::collections::HashSet;

use super::{Event, EventLedger, RequestId, RequestStatus};
use crate::error::{Conflict, GatewayError};

/// Outcome of a batch status update, before it is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationPlan {
    /// Requests to confirm, in caller order.
    pub confirmed: Vec<RequestId>,
    /// Requests to reject: targets in caller order, then cascaded
    /// non-targeted requests oldest first.
    pub rejected: Vec<RequestId>,
}

impl AllocationPlan {
    /// Flattens the plan into `(request, new status)` pairs.
    #[must_use]
    pub fn changes(&self) -> Vec<(RequestId, RequestStatus)> {
        self.confirmed
            .iter()
            .map(|id| (*id, RequestStatus::Confirmed))
            .chain(self.rejected.iter().map(|id| (*id, RequestStatus::Rejected)))
            .collect()
    }
}

/// Plans the batch update of `request_ids` to `desired`.
///
/// # Errors
///
/// - [`GatewayError::InvalidRequest`] if `request_ids` is empty or holds
///   duplicates, or `desired` is neither `CONFIRMED` nor `REJECTED`.
/// - [`GatewayError::RequestNotFound`] if an id is not a request of this
///   event.
/// - [`Conflict::RequestNotPending`] if a target is not `PENDING`.
pub fn allocate(
    event: &Event,
    ledger: &EventLedger,
    request_ids: &[RequestId],
    desired: RequestStatus,
) -> Result<AllocationPlan, GatewayError> {
    if request_ids.is_empty() {
        return Err(GatewayError::InvalidRequest(
            "requestIds must not be empty".to_string(),
        ));
    }
    if !matches!(desired, RequestStatus::Confirmed | RequestStatus::Rejected) {
        return Err(GatewayError::InvalidRequest(format!(
            "status must be CONFIRMED or REJECTED, got {desired}"
        )));
    }

    let mut targeted = HashSet::with_capacity(request_ids.len());
    for &id in request_ids {
        if !targeted.insert(id) {
            return Err(GatewayError::InvalidRequest(format!(
                "request {id} listed more than once"
            )));
        }
        let request = ledger
            .get(id)
            .ok_or(GatewayError::RequestNotFound(*id.as_uuid()))?;
        if request.status != RequestStatus::Pending {
            return Err(Conflict::RequestNotPending.into());
        }
    }

    let mut plan = AllocationPlan::default();

    // Without moderation (or without a limit) every target is confirmed,
    // whatever the caller asked for. A positive limit still caps it.
    let desired = if event.auto_confirms() {
        RequestStatus::Confirmed
    } else {
        desired
    };

    if desired == RequestStatus::Rejected {
        plan.rejected = request_ids.to_vec();
        return Ok(plan);
    }

    if event.participant_limit == 0 {
        plan.confirmed = request_ids.to_vec();
        return Ok(plan);
    }

    let mut remaining = event
        .participant_limit
        .saturating_sub(ledger.confirmed_count());
    for &id in request_ids {
        if remaining > 0 {
            plan.confirmed.push(id);
            remaining -= 1;
        } else {
            plan.rejected.push(id);
        }
    }

    if remaining == 0 {
        plan.rejected.extend(
            ledger
                .pending_ids()
                .into_iter()
                .filter(|id| !targeted.contains(id)),
        );
    }

    Ok(plan)
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::admission::tests::published_event;
    use crate::domain::{Event, ParticipationRequest, UserId};
    use chrono::{Duration, Utc};

    /// Inserts `n` pending requests created one second apart.
    fn pending(event: &Event, ledger: &mut EventLedger, n: usize) -> Vec<RequestId> {
        let start = Utc::now();
        (0..n)
            .map(|i| {
                let created = start + Duration::seconds(i64::try_from(i).unwrap_or_default());
                let request = ParticipationRequest::new(
                    event.id,
                    UserId::new(),
                    RequestStatus::Pending,
                    created,
                );
                let id = request.id;
                let Ok(()) = ledger.insert(request) else {
                    panic!("insert failed");
                };
                id
            })
            .collect()
    }

    fn confirm_one(event: &Event, ledger: &mut EventLedger) {
        let request = ParticipationRequest::new(
            event.id,
            UserId::new(),
            RequestStatus::Confirmed,
            Utc::now(),
        );
        let Ok(()) = ledger.insert(request) else {
            panic!("insert failed");
        };
    }

    #[test]
    fn capacity_exhausted_mid_batch_rejects_the_rest() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 2);

        let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed, ids.get(..1).unwrap_or_default());
        assert_eq!(plan.rejected, ids.get(1..).unwrap_or_default());
    }

    #[test]
    fn exhaustion_cascades_to_untargeted_pending() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 3);
        let (targets, untargeted) = ids.split_at(2);

        let Ok(plan) = allocate(&event, &ledger, targets, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed.len(), 1);
        assert_eq!(plan.rejected.len(), 2);
        assert!(untargeted.iter().all(|id| plan.rejected.contains(id)));
    }

    #[test]
    fn caller_order_decides_who_gets_the_seat() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        let mut ids = pending(&event, &mut ledger, 2);
        ids.reverse();

        let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed.first(), ids.first());
    }

    #[test]
    fn spare_capacity_does_not_cascade() {
        let event = published_event(5, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 3);

        let first = ids.get(..1).unwrap_or_default();
        let Ok(plan) = allocate(&event, &ledger, first, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed.len(), 1);
        assert!(plan.rejected.is_empty());
    }

    #[test]
    fn existing_confirmations_count_against_capacity() {
        let event = published_event(2, true);
        let mut ledger = EventLedger::new(event.id);
        confirm_one(&event, &mut ledger);
        let ids = pending(&event, &mut ledger, 2);

        let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed.len(), 1);
        assert_eq!(plan.rejected.len(), 1);
    }

    #[test]
    fn full_event_rejects_every_target() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        confirm_one(&event, &mut ledger);
        let ids = pending(&event, &mut ledger, 2);

        let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Confirmed) else {
            panic!("allocation failed");
        };
        assert!(plan.confirmed.is_empty());
        assert_eq!(plan.rejected, ids);
    }

    #[test]
    fn reject_leaves_other_pending_alone() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 3);

        let first = ids.get(..1).unwrap_or_default();
        let Ok(plan) = allocate(&event, &ledger, first, RequestStatus::Rejected) else {
            panic!("allocation failed");
        };
        assert!(plan.confirmed.is_empty());
        assert_eq!(plan.rejected, first);
    }

    #[test]
    fn unmoderated_or_unlimited_confirms_regardless_of_desired_status() {
        for event in [published_event(0, true), published_event(5, false)] {
            let mut ledger = EventLedger::new(event.id);
            let ids = pending(&event, &mut ledger, 2);
            let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Rejected) else {
                panic!("allocation failed");
            };
            assert_eq!(plan.confirmed, ids);
            assert!(plan.rejected.is_empty());
        }
    }

    #[test]
    fn unmoderated_confirmation_still_respects_the_limit() {
        let event = published_event(1, false);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 3);

        let Ok(plan) = allocate(&event, &ledger, &ids, RequestStatus::Rejected) else {
            panic!("allocation failed");
        };
        assert_eq!(plan.confirmed, ids.get(..1).unwrap_or_default());
        assert_eq!(plan.rejected, ids.get(1..).unwrap_or_default());
    }

    #[test]
    fn input_validation() {
        let event = published_event(1, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 1);
        let Some(&id) = ids.first() else {
            panic!("one request");
        };

        let Err(GatewayError::InvalidRequest(_)) =
            allocate(&event, &ledger, &[], RequestStatus::Confirmed)
        else {
            panic!("empty list must be rejected");
        };
        let Err(GatewayError::InvalidRequest(_)) =
            allocate(&event, &ledger, &[id, id], RequestStatus::Confirmed)
        else {
            panic!("duplicates must be rejected");
        };
        let Err(GatewayError::InvalidRequest(_)) =
            allocate(&event, &ledger, &ids, RequestStatus::Canceled)
        else {
            panic!("only CONFIRMED/REJECTED are accepted");
        };
        let Err(GatewayError::RequestNotFound(_)) =
            allocate(&event, &ledger, &[RequestId::new()], RequestStatus::Confirmed)
        else {
            panic!("unknown request");
        };
    }

    #[test]
    fn non_pending_target_is_conflict() {
        let event = published_event(3, true);
        let mut ledger = EventLedger::new(event.id);
        let ids = pending(&event, &mut ledger, 1);
        let Some(&id) = ids.first() else {
            panic!("one request");
        };
        let Ok(staged) = ledger.stage(&[(id, RequestStatus::Rejected)]) else {
            panic!("stage failed");
        };
        ledger.commit(&staged);

        let Err(GatewayError::Conflict(Conflict::RequestNotPending)) =
            allocate(&event, &ledger, &ids, RequestStatus::Confirmed)
        else {
            panic!("expected request not pending");
        };
    }

    #[test]
    fn changes_flatten_in_order() {
        let (a, b) = (RequestId::new(), RequestId::new());
        let plan = AllocationPlan {
            confirmed: vec![a],
            rejected: vec![b],
        };
        assert_eq!(
            plan.changes(),
            vec![(a, RequestStatus::Confirmed), (b, RequestStatus::Rejected)]
        );
        assert!(!plan.is_empty());
    }
}
