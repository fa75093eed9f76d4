//! Request service: participation admission, cancellation and capacity
//! allocation.

use chrono::Utc;

use super::Stores;
use crate::domain::{
    AdmissionEvent, EventBus, EventId, ParticipationRequest, RequestId, RequestStatus, UserId,
    admit, allocate,
};
use crate::error::{Conflict, GatewayError};
use crate::persistence::PostgresPersistence;

/// Result of a bulk status update, split by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusUpdate {
    /// Requests confirmed by this call, in caller order.
    pub confirmed: Vec<ParticipationRequest>,
    /// Requests rejected by this call, including pending requests rejected
    /// because the event filled up.
    pub rejected: Vec<ParticipationRequest>,
}

/// Orchestration layer for participation requests.
///
/// Each mutation holds the target event's ledger guard from the first read
/// of the confirmed count until the new statuses are committed, so the
/// confirmed count can never exceed the participant limit.
#[derive(Debug, Clone)]
pub struct RequestService {
    stores: Stores,
    event_bus: EventBus,
    journal: Option<PostgresPersistence>,
}

impl RequestService {
    /// Creates a new `RequestService`.
    #[must_use]
    pub fn new(stores: Stores, event_bus: EventBus, journal: Option<PostgresPersistence>) -> Self {
        Self {
            stores,
            event_bus,
            journal,
        }
    }

    /// Creates a participation request of `requester_id` for `event_id`.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UserNotFound`] / [`GatewayError::EventNotFound`]
    ///   for unknown ids.
    /// - Any admission conflict from [`admit`].
    /// - A persistence error if the journal write fails.
    pub async fn create(
        &self,
        requester_id: UserId,
        event_id: EventId,
    ) -> Result<ParticipationRequest, GatewayError> {
        self.stores.users.ensure_exists(requester_id).await?;
        let ledger = self.stores.requests.ledger(event_id).await?;
        let mut guard = ledger.lock().await;
        let event = self.stores.events.snapshot(event_id).await?;

        let request = admit(&event, &guard, requester_id, Utc::now())?;
        self.persist(std::slice::from_ref(&request)).await?;
        guard.insert(request.clone())?;
        self.stores.requests.index(&request).await;
        drop(guard);

        let _ = self.event_bus.publish(AdmissionEvent::created(&request));
        tracing::info!(
            %event_id,
            request_id = %request.id,
            %requester_id,
            status = %request.status,
            "participation request created"
        );
        Ok(request)
    }

    /// Cancels one of the requester's own requests. Cancelling an already
    /// canceled request returns it unchanged.
    ///
    /// A confirmed request frees its seat; no pending request is promoted
    /// in its place.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UserNotFound`] / [`GatewayError::RequestNotFound`]
    ///   for unknown ids.
    /// - [`Conflict::NotOwner`] if the request belongs to someone else.
    /// - A persistence error if the journal write fails.
    pub async fn cancel(
        &self,
        requester_id: UserId,
        request_id: RequestId,
    ) -> Result<ParticipationRequest, GatewayError> {
        self.stores.users.ensure_exists(requester_id).await?;
        let event_id = self.stores.requests.event_of(request_id).await?;
        let ledger = self.stores.requests.ledger(event_id).await?;
        let mut guard = ledger.lock().await;

        let canceled = guard.stage_cancel(request_id, requester_id)?;
        let previous = guard
            .get(request_id)
            .map_or(RequestStatus::Canceled, |r| r.status);
        if previous == RequestStatus::Canceled {
            return Ok(canceled);
        }

        self.persist(std::slice::from_ref(&canceled)).await?;
        guard.commit(std::slice::from_ref(&canceled));
        drop(guard);

        let _ = self
            .event_bus
            .publish(AdmissionEvent::status_changed(&canceled, previous));
        tracing::info!(%event_id, %request_id, from = %previous, "participation request canceled");
        Ok(canceled)
    }

    /// Lists every request made by `requester_id`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown requester.
    pub async fn list_for_requester(
        &self,
        requester_id: UserId,
    ) -> Result<Vec<ParticipationRequest>, GatewayError> {
        self.stores.users.ensure_exists(requester_id).await?;
        Ok(self.stores.requests.list_for_requester(requester_id).await)
    }

    /// Lists every request for one of the initiator's events, oldest first.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UserNotFound`] / [`GatewayError::EventNotFound`]
    ///   for unknown ids.
    /// - [`Conflict::NotInitiator`] if the caller does not own the event.
    pub async fn list_for_event(
        &self,
        initiator_id: UserId,
        event_id: EventId,
    ) -> Result<Vec<ParticipationRequest>, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        let ledger = self.stores.requests.ledger(event_id).await?;
        let guard = ledger.lock().await;
        let event = self.stores.events.snapshot(event_id).await?;
        if event.initiator_id != initiator_id {
            return Err(Conflict::NotInitiator.into());
        }
        Ok(guard.requests())
    }

    /// Confirms or rejects pending requests of one of the initiator's
    /// events, respecting the participant limit.
    ///
    /// When the limit is reached mid-batch, the remaining targets and every
    /// other pending request of the event are rejected.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::UserNotFound`] / [`GatewayError::EventNotFound`] /
    ///   [`GatewayError::RequestNotFound`] for unknown ids.
    /// - [`Conflict::NotInitiator`] if the caller does not own the event.
    /// - [`GatewayError::InvalidRequest`] / [`Conflict::RequestNotPending`]
    ///   from [`allocate`].
    /// - A persistence error if the journal write fails.
    pub async fn update_status(
        &self,
        initiator_id: UserId,
        event_id: EventId,
        request_ids: &[RequestId],
        desired: RequestStatus,
    ) -> Result<StatusUpdate, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        let ledger = self.stores.requests.ledger(event_id).await?;
        let mut guard = ledger.lock().await;
        let event = self.stores.events.snapshot(event_id).await?;
        if event.initiator_id != initiator_id {
            return Err(Conflict::NotInitiator.into());
        }

        let plan = allocate(&event, &guard, request_ids, desired)?;
        let staged = guard.stage(&plan.changes())?;
        self.persist(&staged).await?;
        guard.commit(&staged);
        let confirmed_total = guard.confirmed_count();
        drop(guard);

        self.event_bus.publish_all(
            staged
                .iter()
                .map(|r| AdmissionEvent::status_changed(r, RequestStatus::Pending)),
        );

        let (confirmed, rejected): (Vec<_>, Vec<_>) = staged
            .into_iter()
            .partition(|r| r.status == RequestStatus::Confirmed);
        tracing::info!(
            %event_id,
            confirmed = confirmed.len(),
            rejected = rejected.len(),
            confirmed_total,
            "participation requests updated"
        );
        Ok(StatusUpdate {
            confirmed,
            rejected,
        })
    }

    async fn persist(&self, records: &[ParticipationRequest]) -> Result<(), GatewayError> {
        match &self.journal {
            Some(journal) => journal.save_requests(records).await,
            None => Ok(()),
        }
    }
}
