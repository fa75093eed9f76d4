//! Event record and its publication lifecycle.
//!
//! The lifecycle is an explicit transition table over
//! `(EventState, EventAction)`; see [`EventState::apply`]. Participation
//! admission only ever asks [`EventState::accepts_requests`].
//!
//! ```text
//!            PublishEvent
//!   PENDING ─────────────▶ PUBLISHED
//!     │  ▲
//!     │  │ SendToReview
//!     ▼  │
//!   CANCELED   (RejectEvent / CancelReview)
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{EventId, UserId};
use crate::error::{Conflict, GatewayError};

/// Minimum lead time, in hours, between now and `event_date` for edits made
/// by the event initiator.
pub const INITIATOR_LEAD_HOURS: i64 = 2;

/// Minimum lead time, in hours, between now and `event_date` for edits and
/// publication made by an administrator.
pub const ADMIN_LEAD_HOURS: i64 = 1;

/// Publication state of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventState {
    /// Awaiting moderation.
    Pending,
    /// Visible and open for participation requests.
    Published,
    /// Rejected by an administrator or withdrawn by the initiator.
    Canceled,
}

/// Lifecycle actions that move an event between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventAction {
    /// Administrator publishes a pending event.
    PublishEvent,
    /// Administrator rejects a pending event.
    RejectEvent,
    /// Initiator (re)submits the event for moderation.
    SendToReview,
    /// Initiator withdraws the event before publication.
    CancelReview,
}

/// Who is editing an event. Decides the allowed actions and lead time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Editor {
    /// The user who created the event.
    Initiator,
    /// A platform administrator.
    Admin,
}

impl EventState {
    /// Whether participation requests may be admitted against this state.
    #[must_use]
    pub const fn accepts_requests(self) -> bool {
        matches!(self, Self::Published)
    }

    /// Returns the state reached by applying `action`, or the conflict
    /// explaining why the action is not allowed.
    ///
    /// # Errors
    ///
    /// Returns [`Conflict::EventNotPending`] for publish/reject outside
    /// `PENDING`, and [`Conflict::InvalidTransition`] for initiator actions
    /// on a published event.
    pub fn apply(self, action: EventAction) -> Result<Self, Conflict> {
        use EventAction::{CancelReview, PublishEvent, RejectEvent, SendToReview};
        use EventState::{Canceled, Pending, Published};

        match (self, action) {
            (Pending, PublishEvent) => Ok(Published),
            (Pending, RejectEvent) => Ok(Canceled),
            (Published | Canceled, PublishEvent | RejectEvent) => Err(Conflict::EventNotPending),
            (Pending | Canceled, SendToReview) => Ok(Pending),
            (Pending | Canceled, CancelReview) => Ok(Canceled),
            (Published, SendToReview | CancelReview) => Err(Conflict::InvalidTransition {
                state: self.to_string(),
                action: action.to_string(),
            }),
        }
    }
}

impl EventAction {
    /// Returns the editor role allowed to perform this action.
    #[must_use]
    pub const fn performed_by(self) -> Editor {
        match self {
            Self::PublishEvent | Self::RejectEvent => Editor::Admin,
            Self::SendToReview | Self::CancelReview => Editor::Initiator,
        }
    }
}

impl Editor {
    /// Minimum distance between now and the event date this editor may set.
    #[must_use]
    pub fn min_lead(self) -> Duration {
        match self {
            Self::Initiator => Duration::hours(INITIATOR_LEAD_HOURS),
            Self::Admin => Duration::hours(ADMIN_LEAD_HOURS),
        }
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Published => "PUBLISHED",
            Self::Canceled => "CANCELED",
        };
        f.write_str(s)
    }
}

impl fmt::Display for EventAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::PublishEvent => "PUBLISH_EVENT",
            Self::RejectEvent => "REJECT_EVENT",
            Self::SendToReview => "SEND_TO_REVIEW",
            Self::CancelReview => "CANCEL_REVIEW",
        };
        f.write_str(s)
    }
}

/// Fields supplied when an initiator creates an event.
#[derive(Debug, Clone)]
pub struct NewEvent {
    /// Short title (3–120 chars).
    pub title: String,
    /// Teaser text (20–2000 chars).
    pub annotation: String,
    /// Full description (20–7000 chars).
    pub description: String,
    /// When the event takes place.
    pub event_date: DateTime<Utc>,
    /// Maximum confirmed participants; 0 means unlimited.
    pub participant_limit: u32,
    /// Whether requests need initiator confirmation.
    pub request_moderation: bool,
}

/// Partial update applied by an initiator or administrator.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    /// New title.
    pub title: Option<String>,
    /// New annotation.
    pub annotation: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New event date.
    pub event_date: Option<DateTime<Utc>>,
    /// New participant limit.
    pub participant_limit: Option<u32>,
    /// New moderation flag.
    pub request_moderation: Option<bool>,
    /// Lifecycle action to apply after the field edits.
    pub state_action: Option<EventAction>,
}

/// A capacity-limited event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Unique identifier.
    pub id: EventId,
    /// User who created the event.
    pub initiator_id: UserId,
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
    /// Creation timestamp.
    pub created_on: DateTime<Utc>,
    /// Set when the event is published.
    pub published_at: Option<DateTime<Utc>>,
    /// When the event takes place.
    pub event_date: DateTime<Utc>,
}

impl Event {
    /// Creates a `PENDING` event owned by `initiator_id`.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidRequest`] for out-of-range text fields
    /// and [`Conflict::EventDateTooClose`] if the event starts less than
    /// [`INITIATOR_LEAD_HOURS`] from `now`.
    pub fn new(
        initiator_id: UserId,
        fields: NewEvent,
        now: DateTime<Utc>,
    ) -> Result<Self, GatewayError> {
        validate_text("title", &fields.title, 3, 120)?;
        validate_text("annotation", &fields.annotation, 20, 2000)?;
        validate_text("description", &fields.description, 20, 7000)?;
        ensure_lead(fields.event_date, now, Editor::Initiator)?;

        Ok(Self {
            id: EventId::new(),
            initiator_id,
            title: fields.title,
            annotation: fields.annotation,
            description: fields.description,
            state: EventState::Pending,
            participant_limit: fields.participant_limit,
            request_moderation: fields.request_moderation,
            created_on: now,
            published_at: None,
            event_date: fields.event_date,
        })
    }

    /// Whether new participation requests should start `CONFIRMED`.
    #[must_use]
    pub const fn auto_confirms(&self) -> bool {
        !self.request_moderation || self.participant_limit == 0
    }

    /// Applies `patch` on behalf of `editor`.
    ///
    /// Everything is validated before anything is written, so a failed
    /// patch leaves the event untouched. Returns the `(from, to)` state pair
    /// when the lifecycle state changed.
    ///
    /// # Errors
    ///
    /// - [`Conflict::EventAlreadyPublished`] if an initiator edits a
    ///   published event.
    /// - [`GatewayError::InvalidRequest`] if the action belongs to the other
    ///   editor role or a text field is out of range.
    /// - [`Conflict::EventDateTooClose`] if the (new) date violates the
    ///   editor's lead time, or a publish would go live too late.
    /// - Any conflict from [`EventState::apply`].
    pub fn apply_patch(
        &mut self,
        patch: EventPatch,
        editor: Editor,
        now: DateTime<Utc>,
    ) -> Result<Option<(EventState, EventState)>, GatewayError> {
        if editor == Editor::Initiator && self.state == EventState::Published {
            return Err(Conflict::EventAlreadyPublished.into());
        }

        if let Some(title) = &patch.title {
            validate_text("title", title, 3, 120)?;
        }
        if let Some(annotation) = &patch.annotation {
            validate_text("annotation", annotation, 20, 2000)?;
        }
        if let Some(description) = &patch.description {
            validate_text("description", description, 20, 7000)?;
        }
        if let Some(date) = patch.event_date {
            ensure_lead(date, now, editor)?;
        }

        let next_state = match patch.state_action {
            Some(action) => {
                if action.performed_by() != editor {
                    return Err(GatewayError::InvalidRequest(format!(
                        "state action {action} is not available here"
                    )));
                }
                let next = self.state.apply(action)?;
                if action == EventAction::PublishEvent {
                    ensure_lead(patch.event_date.unwrap_or(self.event_date), now, Editor::Admin)?;
                }
                Some(next)
            }
            None => None,
        };

        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(annotation) = patch.annotation {
            self.annotation = annotation;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(date) = patch.event_date {
            self.event_date = date;
        }
        if let Some(limit) = patch.participant_limit {
            self.participant_limit = limit;
        }
        if let Some(moderation) = patch.request_moderation {
            self.request_moderation = moderation;
        }

        let Some(next) = next_state else {
            return Ok(None);
        };
        let previous = self.state;
        self.state = next;
        if next == EventState::Published {
            self.published_at = Some(now);
        }
        Ok((previous != next).then_some((previous, next)))
    }
}

fn ensure_lead(date: DateTime<Utc>, now: DateTime<Utc>, editor: Editor) -> Result<(), Conflict> {
    if date < now + editor.min_lead() {
        return Err(Conflict::EventDateTooClose);
    }
    Ok(())
}

fn validate_text(field: &str, value: &str, min: usize, max: usize) -> Result<(), GatewayError> {
    let len = value.trim().chars().count();
    if len < min || len > max {
        return Err(GatewayError::InvalidRequest(format!(
            "{field} must be between {min} and {max} characters"
        )));
    }
    Ok(())
}
