//! Event handlers: initiator-owned events and the public event view.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{EventDto, NewEventRequest, UpdateEventRequest};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::domain::{EventId, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users/{userId}/events` — Create an event.
///
/// # Errors
///
/// Returns [`GatewayError`] on an unknown user, invalid fields or an event
/// date that is too close.
#[utoipa::path(
    post,
    path = "/users/{userId}/events",
    tag = "Events",
    summary = "Create an event",
    description = "Creates a PENDING event owned by the user. The event must start at least two hours from now.",
    params(("userId" = uuid::Uuid, Path, description = "Initiator UUID")),
    request_body = NewEventRequest,
    responses(
        (status = 201, description = "Event created", body = EventDto),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 409, description = "Event date too close", body = ErrorResponse),
    )
)]
pub async fn create_event(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiJson(req): ApiJson<NewEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .event_service
        .create_event(user_id, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(EventDto::from(view))))
}

/// `GET /users/{userId}/events` — List the user's events.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown user.
#[utoipa::path(
    get,
    path = "/users/{userId}/events",
    tag = "Events",
    summary = "List own events",
    description = "Returns every event created by the user, newest first.",
    params(("userId" = uuid::Uuid, Path, description = "Initiator UUID")),
    responses(
        (status = 200, description = "Events of the user", body = Vec<EventDto>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_events(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<impl IntoResponse, GatewayError> {
    let views = state.event_service.list_for_initiator(user_id).await?;
    let body: Vec<EventDto> = views.into_iter().map(EventDto::from).collect();
    Ok(Json(body))
}

/// `GET /users/{userId}/events/{eventId}` — Get one of the user's events.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] if the event does not exist or
/// belongs to someone else.
#[utoipa::path(
    get,
    path = "/users/{userId}/events/{eventId}",
    tag = "Events",
    summary = "Get own event",
    params(
        ("userId" = uuid::Uuid, Path, description = "Initiator UUID"),
        ("eventId" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Event details", body = EventDto),
        (status = 404, description = "User or event not found", body = ErrorResponse),
    )
)]
pub async fn get_event(
    State(state): State<AppState>,
    ApiPath((user_id, event_id)): ApiPath<(UserId, EventId)>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .event_service
        .get_for_initiator(user_id, event_id)
        .await?;
    Ok(Json(EventDto::from(view)))
}

/// `PATCH /users/{userId}/events/{eventId}` — Edit an unpublished event.
///
/// # Errors
///
/// Returns [`GatewayError`] if the event is not the user's, is already
/// published, or the edit is invalid.
#[utoipa::path(
    patch,
    path = "/users/{userId}/events/{eventId}",
    tag = "Events",
    summary = "Edit own event",
    description = "Applies field edits and an optional SEND_TO_REVIEW or CANCEL_REVIEW action. Published events cannot be edited by their initiator.",
    params(
        ("userId" = uuid::Uuid, Path, description = "Initiator UUID"),
        ("eventId" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventDto),
        (status = 400, description = "Invalid fields or action", body = ErrorResponse),
        (status = 404, description = "User or event not found", body = ErrorResponse),
        (status = 409, description = "Edit not allowed in the current state", body = ErrorResponse),
    )
)]
pub async fn update_event(
    State(state): State<AppState>,
    ApiPath((user_id, event_id)): ApiPath<(UserId, EventId)>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .event_service
        .update_by_initiator(user_id, event_id, req.into())
        .await?;
    Ok(Json(EventDto::from(view)))
}

/// `GET /events/{eventId}` — Get a published event.
///
/// # Errors
///
/// Returns [`GatewayError::EventNotFound`] unless the event is published.
#[utoipa::path(
    get,
    path = "/events/{eventId}",
    tag = "Events",
    summary = "Get published event",
    params(("eventId" = uuid::Uuid, Path, description = "Event UUID")),
    responses(
        (status = 200, description = "Event details", body = EventDto),
        (status = 404, description = "Event not found or not published", body = ErrorResponse),
    )
)]
pub async fn get_published_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<EventId>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state.event_service.get_published(event_id).await?;
    Ok(Json(EventDto::from(view)))
}

/// Event routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{userId}/events", get(list_events).post(create_event))
        .route(
            "/users/{userId}/events/{eventId}",
            get(get_event).patch(update_event),
        )
        .route("/events/{eventId}", get(get_published_event))
}
