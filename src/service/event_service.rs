//! Event service: creation, edits and the publication lifecycle.

use chrono::Utc;

use super::Stores;
use crate::domain::{
    AdmissionEvent, Editor, Event, EventBus, EventId, EventPatch, NewEvent, UserId,
};
use crate::error::{Conflict, GatewayError};
use crate::persistence::PostgresPersistence;

/// An event together with its current confirmed count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventView {
    /// The event record.
    pub event: Event,
    /// Number of `CONFIRMED` participation requests.
    pub confirmed_requests: u32,
}

/// Orchestration layer for the event lifecycle.
///
/// Lifecycle edits run inside the event's ledger guard so that a limit
/// change or a state change can never interleave with an admission
/// decision on the same event.
#[derive(Debug, Clone)]
pub struct EventService {
    stores: Stores,
    event_bus: EventBus,
    journal: Option<PostgresPersistence>,
}

impl EventService {
    /// Creates a new `EventService`.
    #[must_use]
    pub fn new(stores: Stores, event_bus: EventBus, journal: Option<PostgresPersistence>) -> Self {
        Self {
            stores,
            event_bus,
            journal,
        }
    }

    /// Creates a `PENDING` event owned by `initiator_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown initiator, a
    /// validation or date conflict from [`Event::new`], or a persistence
    /// error.
    pub async fn create_event(
        &self,
        initiator_id: UserId,
        fields: NewEvent,
    ) -> Result<EventView, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        let event = Event::new(initiator_id, fields, Utc::now())?;

        if let Some(journal) = &self.journal {
            journal.save_event(&event).await?;
        }
        self.stores.requests.open(event.id).await;
        self.stores.events.insert(event.clone()).await?;

        tracing::info!(event_id = %event.id, %initiator_id, "event created");
        Ok(EventView {
            event,
            confirmed_requests: 0,
        })
    }

    /// Applies an initiator's edit (fields plus `SEND_TO_REVIEW` /
    /// `CANCEL_REVIEW`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event does not exist
    /// or belongs to someone else, plus anything [`Event::apply_patch`]
    /// rejects.
    pub async fn update_by_initiator(
        &self,
        initiator_id: UserId,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<EventView, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        self.update(event_id, patch, Editor::Initiator, Some(initiator_id))
            .await
    }

    /// Applies an administrator's edit (fields plus `PUBLISH_EVENT` /
    /// `REJECT_EVENT`).
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event does not exist,
    /// plus anything [`Event::apply_patch`] rejects.
    pub async fn update_by_admin(
        &self,
        event_id: EventId,
        patch: EventPatch,
    ) -> Result<EventView, GatewayError> {
        self.update(event_id, patch, Editor::Admin, None).await
    }

    /// Returns one of the initiator's own events.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] if the event does not exist
    /// or belongs to someone else.
    pub async fn get_for_initiator(
        &self,
        initiator_id: UserId,
        event_id: EventId,
    ) -> Result<EventView, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        let event = self.stores.events.snapshot(event_id).await?;
        if event.initiator_id != initiator_id {
            return Err(GatewayError::EventNotFound(*event_id.as_uuid()));
        }
        Ok(self.view(event).await)
    }

    /// Lists the initiator's events, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::UserNotFound`] for an unknown initiator.
    pub async fn list_for_initiator(
        &self,
        initiator_id: UserId,
    ) -> Result<Vec<EventView>, GatewayError> {
        self.stores.users.ensure_exists(initiator_id).await?;
        let events = self.stores.events.list_by_initiator(initiator_id).await;
        let mut views = Vec::with_capacity(events.len());
        for event in events {
            views.push(self.view(event).await);
        }
        Ok(views)
    }

    /// Returns a published event.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::EventNotFound`] unless the event exists and
    /// is published.
    pub async fn get_published(&self, event_id: EventId) -> Result<EventView, GatewayError> {
        let event = self.stores.events.snapshot(event_id).await?;
        if !event.state.accepts_requests() {
            return Err(GatewayError::EventNotFound(*event_id.as_uuid()));
        }
        Ok(self.view(event).await)
    }

    async fn update(
        &self,
        event_id: EventId,
        patch: EventPatch,
        editor: Editor,
        owner: Option<UserId>,
    ) -> Result<EventView, GatewayError> {
        let ledger = self.stores.requests.ledger(event_id).await?;
        let guard = ledger.lock().await;
        let record = self.stores.events.get(event_id).await?;
        let mut event = record.write().await;

        if owner.is_some_and(|owner| owner != event.initiator_id) {
            return Err(GatewayError::EventNotFound(*event_id.as_uuid()));
        }

        let confirmed_requests = guard.confirmed_count();
        if let Some(limit) = patch.participant_limit
            && limit > 0
            && limit < confirmed_requests
        {
            return Err(Conflict::LimitBelowConfirmed.into());
        }

        let mut next = event.clone();
        let transition = next.apply_patch(patch, editor, Utc::now())?;
        if let Some(journal) = &self.journal {
            journal.save_event(&next).await?;
        }
        *event = next.clone();
        drop(event);
        drop(guard);

        if let Some((from, to)) = transition {
            let _ = self.event_bus.publish(AdmissionEvent::EventStateChanged {
                event_id,
                from,
                to,
                timestamp: Utc::now(),
            });
            tracing::info!(%event_id, %from, %to, ?editor, "event state changed");
        } else {
            tracing::info!(%event_id, ?editor, "event updated");
        }

        Ok(EventView {
            event: next,
            confirmed_requests,
        })
    }

    async fn view(&self, event: Event) -> EventView {
        let confirmed_requests = self.stores.requests.confirmed_count(event.id).await;
        EventView {
            event,
            confirmed_requests,
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::{EventAction, EventState, User};
    use chrono::Duration;
    use tokio_test::assert_err;

    pub(crate) fn new_event(limit: u32, moderation: bool) -> NewEvent {
        NewEvent {
            title: "Rust meetup".to_string(),
            annotation: "An evening of talks about async Rust".to_string(),
            description: "Three talks, pizza and a lot of questions about pinning".to_string(),
            event_date: Utc::now() + Duration::days(3),
            participant_limit: limit,
            request_moderation: moderation,
        }
    }

    pub(crate) async fn user(stores: &Stores, name: &str) -> User {
        let Ok(user) = User::new(name, &format!("{name}@example.com"), Utc::now()) else {
            panic!("registration failed");
        };
        stores.users.insert(user.clone()).await;
        user
    }

    pub(crate) fn publish() -> EventPatch {
        EventPatch {
            state_action: Some(EventAction::PublishEvent),
            ..EventPatch::default()
        }
    }

    fn service() -> (EventService, Stores) {
        let stores = Stores::new();
        (
            EventService::new(stores.clone(), EventBus::new(64), None),
            stores,
        )
    }

    #[tokio::test]
    async fn created_events_start_pending_with_an_open_ledger() {
        let (service, stores) = service();
        let owner = user(&stores, "ada").await;

        let Ok(view) = service.create_event(owner.id, new_event(2, true)).await else {
            panic!("create failed");
        };
        assert_eq!(view.event.state, EventState::Pending);
        assert_eq!(view.confirmed_requests, 0);
        assert!(stores.requests.ledger(view.event.id).await.is_ok());
    }

    #[tokio::test]
    async fn unknown_initiator_cannot_create() {
        let (service, _) = service();
        let Err(GatewayError::UserNotFound(_)) =
            service.create_event(UserId::new(), new_event(0, false)).await
        else {
            panic!("expected user not found");
        };
    }

    #[tokio::test]
    async fn admin_publish_emits_state_change() {
        let (service, stores) = service();
        let mut rx = service.event_bus.subscribe();
        let owner = user(&stores, "ada").await;
        let Ok(view) = service.create_event(owner.id, new_event(2, true)).await else {
            panic!("create failed");
        };

        let Ok(published) = service.update_by_admin(view.event.id, publish()).await else {
            panic!("publish failed");
        };
        assert_eq!(published.event.state, EventState::Published);
        assert!(published.event.published_at.is_some());

        let Ok(AdmissionEvent::EventStateChanged { from, to, .. }) = rx.recv().await else {
            panic!("expected state change notification");
        };
        assert_eq!((from, to), (EventState::Pending, EventState::Published));
    }

    #[tokio::test]
    async fn only_published_events_are_public() {
        let (service, stores) = service();
        let owner = user(&stores, "ada").await;
        let Ok(view) = service.create_event(owner.id, new_event(2, true)).await else {
            panic!("create failed");
        };
        let event_id = view.event.id;

        assert_err!(service.get_published(event_id).await);
        let Ok(_) = service.update_by_admin(event_id, publish()).await else {
            panic!("publish failed");
        };
        let Ok(public) = service.get_published(event_id).await else {
            panic!("published event should be visible");
        };
        assert_eq!(public.event.id, event_id);
    }

    #[tokio::test]
    async fn other_users_cannot_see_or_edit_an_event() {
        let (service, stores) = service();
        let owner = user(&stores, "ada").await;
        let stranger = user(&stores, "eve").await;
        let Ok(view) = service.create_event(owner.id, new_event(2, true)).await else {
            panic!("create failed");
        };
        let event_id = view.event.id;

        let Err(GatewayError::EventNotFound(_)) =
            service.get_for_initiator(stranger.id, event_id).await
        else {
            panic!("expected not found");
        };
        let patch = EventPatch {
            title: Some("Hijacked".to_string()),
            ..EventPatch::default()
        };
        let Err(GatewayError::EventNotFound(_)) =
            service.update_by_initiator(stranger.id, event_id, patch).await
        else {
            panic!("expected not found");
        };
    }

    #[tokio::test]
    async fn initiator_cannot_edit_published_event() {
        let (service, stores) = service();
        let owner = user(&stores, "ada").await;
        let Ok(view) = service.create_event(owner.id, new_event(2, true)).await else {
            panic!("create failed");
        };
        let event_id = view.event.id;
        let Ok(_) = service.update_by_admin(event_id, publish()).await else {
            panic!("publish failed");
        };

        let patch = EventPatch {
            title: Some("Renamed".to_string()),
            ..EventPatch::default()
        };
        let Err(GatewayError::Conflict(Conflict::EventAlreadyPublished)) =
            service.update_by_initiator(owner.id, event_id, patch).await
        else {
            panic!("expected conflict");
        };
    }

    #[tokio::test]
    async fn list_returns_only_own_events() {
        let (service, stores) = service();
        let owner = user(&stores, "ada").await;
        let other = user(&stores, "bob").await;
        for _ in 0..2 {
            let Ok(_) = service.create_event(owner.id, new_event(0, false)).await else {
                panic!("create failed");
            };
        }
        let Ok(_) = service.create_event(other.id, new_event(0, false)).await else {
            panic!("create failed");
        };

        let Ok(views) = service.list_for_initiator(owner.id).await else {
            panic!("list failed");
        };
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.event.initiator_id == owner.id));
    }
}
