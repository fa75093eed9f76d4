//! Participation request storage with one admission lock per event.
//!
//! [`RequestStore`] keeps every request inside the [`EventLedger`] of the
//! event it targets. Each ledger sits behind its own
//! [`tokio::sync::Mutex`]; holding that guard is the critical section in
//! which the confirmed count of one event is read and written.
//!
//! # Concurrency
//!
//! - Admission work on the same event is serialized by the ledger mutex.
//! - Different events never contend.
//! - Callers take at most one ledger guard at a time, and take it before
//!   any event record lock, so no lock cycle can form.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use super::{EventId, ParticipationRequest, RequestId, RequestStatus, UserId};
use crate::error::{Conflict, GatewayError};

/// All participation requests of a single event plus its cached
/// confirmed count.
///
/// The cached count is only ever changed by [`EventLedger::insert`] and
/// [`EventLedger::commit`], both of which require `&mut self`, i.e. the
/// ledger guard.
#[derive(Debug)]
pub struct EventLedger {
    event_id: EventId,
    requests: HashMap<RequestId, ParticipationRequest>,
    confirmed: u32,
}

impl EventLedger {
    /// Creates an empty ledger for `event_id`.
    #[must_use]
    pub fn new(event_id: EventId) -> Self {
        Self {
            event_id,
            requests: HashMap::new(),
            confirmed: 0,
        }
    }

    /// Number of `CONFIRMED` requests.
    #[must_use]
    pub const fn confirmed_count(&self) -> u32 {
        self.confirmed
    }

    /// Looks up a request of this event.
    #[must_use]
    pub fn get(&self, request_id: RequestId) -> Option<&ParticipationRequest> {
        self.requests.get(&request_id)
    }

    /// Returns the requester's non-canceled request, if any.
    #[must_use]
    pub fn active_request_of(&self, requester_id: UserId) -> Option<&ParticipationRequest> {
        self.requests
            .values()
            .find(|r| r.requester_id == requester_id && r.status.is_active())
    }

    /// All requests, oldest first.
    #[must_use]
    pub fn requests(&self) -> Vec<ParticipationRequest> {
        let mut all: Vec<ParticipationRequest> = self.requests.values().cloned().collect();
        all.sort_by_key(|r| (r.created_at, r.id));
        all
    }

    /// Ids of all `PENDING` requests, oldest first.
    #[must_use]
    pub fn pending_ids(&self) -> Vec<RequestId> {
        let mut pending: Vec<&ParticipationRequest> = self
            .requests
            .values()
            .filter(|r| r.status == RequestStatus::Pending)
            .collect();
        pending.sort_by_key(|r| (r.created_at, r.id));
        pending.into_iter().map(|r| r.id).collect()
    }

    /// Adds a request to the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] if the request belongs to another
    /// event or its id is already present.
    pub fn insert(&mut self, request: ParticipationRequest) -> Result<(), GatewayError> {
        if request.event_id != self.event_id {
            return Err(GatewayError::Internal(format!(
                "request {} targets event {}, not {}",
                request.id, request.event_id, self.event_id
            )));
        }
        if self.requests.contains_key(&request.id) {
            return Err(GatewayError::Internal(format!(
                "request {} already exists",
                request.id
            )));
        }
        if request.status.holds_capacity() {
            self.confirmed = self.confirmed.saturating_add(1);
        }
        self.requests.insert(request.id, request);
        Ok(())
    }

    /// Computes the records that result from moving each request to the
    /// given status, without changing the ledger.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestNotFound`] for ids outside this
    /// ledger and [`Conflict::RequestNotPending`] for any transition the
    /// request lifecycle forbids.
    pub fn stage(
        &self,
        changes: &[(RequestId, RequestStatus)],
    ) -> Result<Vec<ParticipationRequest>, GatewayError> {
        changes
            .iter()
            .map(|&(id, target)| -> Result<ParticipationRequest, GatewayError> {
                let current = self
                    .requests
                    .get(&id)
                    .ok_or(GatewayError::RequestNotFound(*id.as_uuid()))?;
                let mut next = current.clone();
                next.status = current.status.decide(target)?;
                Ok(next)
            })
            .collect()
    }

    /// Returns the record of `request_id` with status `CANCELED`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestNotFound`] for ids outside this
    /// ledger and [`Conflict::NotOwner`] if `requester_id` did not create
    /// the request.
    pub fn stage_cancel(
        &self,
        request_id: RequestId,
        requester_id: UserId,
    ) -> Result<ParticipationRequest, GatewayError> {
        let current = self
            .requests
            .get(&request_id)
            .ok_or(GatewayError::RequestNotFound(*request_id.as_uuid()))?;
        if current.requester_id != requester_id {
            return Err(Conflict::NotOwner.into());
        }
        let mut next = current.clone();
        next.status = RequestStatus::Canceled;
        Ok(next)
    }

    /// Replaces existing records with `updated`, keeping the confirmed
    /// count in step. Records not already in the ledger are ignored.
    pub fn commit(&mut self, updated: &[ParticipationRequest]) {
        for record in updated {
            let Some(slot) = self.requests.get_mut(&record.id) else {
                continue;
            };
            match (slot.status.holds_capacity(), record.status.holds_capacity()) {
                (false, true) => self.confirmed = self.confirmed.saturating_add(1),
                (true, false) => self.confirmed = self.confirmed.saturating_sub(1),
                _ => {}
            }
            *slot = record.clone();
        }
    }
}

/// Central store for all participation requests.
///
/// Uses a `RwLock<HashMap<...>>` of per-event `Arc<Mutex<EventLedger>>`
/// plus a request-id index for lookups that arrive without an event id
/// (cancellation).
#[derive(Debug, Default)]
pub struct RequestStore {
    ledgers: RwLock<HashMap<EventId, Arc<Mutex<EventLedger>>>>,
    index: RwLock<HashMap<RequestId, EventId>>,
}

impl RequestStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens an empty ledger for a newly created event. Opening an existing
    /// ledger is a no-op.
    pub async fn open(&self, event_id: EventId) {
        self.ledgers
            .write()
            .await
            .entry(event_id)
            .or_insert_with(|| Arc::new(Mutex::new(EventLedger::new(event_id))));
    }

    /// Returns the admission lock of `event_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if no ledger was opened for
    /// the event.
    pub async fn ledger(&self, event_id: EventId) -> Result<Arc<Mutex<EventLedger>>, GatewayError> {
        let map = self.ledgers.read().await;
        map.get(&event_id)
            .cloned()
            .ok_or(GatewayError::EventNotFound(*event_id.as_uuid()))
    }

    /// Records which event a request belongs to.
    pub async fn index(&self, request: &ParticipationRequest) {
        self.index.write().await.insert(request.id, request.event_id);
    }

    /// Resolves the event a request belongs to.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::RequestNotFound`] for unknown ids.
    pub async fn event_of(&self, request_id: RequestId) -> Result<EventId, GatewayError> {
        self.index
            .read()
            .await
            .get(&request_id)
            .copied()
            .ok_or(GatewayError::RequestNotFound(*request_id.as_uuid()))
    }

    /// Current confirmed count of an event (0 for unknown events).
    pub async fn confirmed_count(&self, event_id: EventId) -> u32 {
        match self.ledger(event_id).await {
            Ok(ledger) => ledger.lock().await.confirmed_count(),
            Err(_) => 0,
        }
    }

    /// All requests made by `requester_id`, oldest first.
    pub async fn list_for_requester(&self, requester_id: UserId) -> Vec<ParticipationRequest> {
        let ledgers: Vec<Arc<Mutex<EventLedger>>> =
            self.ledgers.read().await.values().cloned().collect();

        let mut found = Vec::new();
        for ledger in ledgers {
            let guard = ledger.lock().await;
            found.extend(
                guard
                    .requests
                    .values()
                    .filter(|r| r.requester_id == requester_id)
                    .cloned(),
            );
        }
        found.sort_by_key(|r| (r.created_at, r.id));
        found
    }

    /// Loads previously persisted requests, opening ledgers as needed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::Internal`] on duplicate request ids.
    pub async fn restore(&self, requests: Vec<ParticipationRequest>) -> Result<usize, GatewayError> {
        let mut restored = 0;
        for request in requests {
            self.open(request.event_id).await;
            let ledger = self.ledger(request.event_id).await?;
            self.index(&request).await;
            ledger.lock().await.insert(request)?;
            restored += 1;
        }
        Ok(restored)
    }
}
