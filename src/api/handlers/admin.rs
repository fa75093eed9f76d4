//! Administrator handlers: event moderation and user registration.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{patch, post};
use axum::{Json, Router};

use crate::api::dto::{EventDto, NewUserRequest, UpdateEventRequest, UserDto};
use crate::api::extract::{ApiJson, ApiPath};
use crate::app_state::AppState;
use crate::domain::EventId;
use crate::error::{ErrorResponse, GatewayError};

/// `PATCH /admin/events/{eventId}` — Edit, publish or reject an event.
///
/// # Errors
///
/// Returns [`GatewayError`] if the event does not exist, the action is not
/// allowed from the current state, or the edit is invalid.
#[utoipa::path(
    patch,
    path = "/admin/events/{eventId}",
    tag = "Admin",
    summary = "Moderate an event",
    description = "Applies field edits and an optional PUBLISH_EVENT or REJECT_EVENT action. Only PENDING events can be published or rejected.",
    params(("eventId" = uuid::Uuid, Path, description = "Event UUID")),
    request_body = UpdateEventRequest,
    responses(
        (status = 200, description = "Updated event", body = EventDto),
        (status = 400, description = "Invalid fields or action", body = ErrorResponse),
        (status = 404, description = "Event not found", body = ErrorResponse),
        (status = 409, description = "Transition not allowed", body = ErrorResponse),
    )
)]
pub async fn moderate_event(
    State(state): State<AppState>,
    ApiPath(event_id): ApiPath<EventId>,
    ApiJson(req): ApiJson<UpdateEventRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let view = state
        .event_service
        .update_by_admin(event_id, req.into())
        .await?;
    Ok(Json(EventDto::from(view)))
}

/// `POST /admin/users` — Register a user.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidRequest`] on a blank name or invalid
/// email.
#[utoipa::path(
    post,
    path = "/admin/users",
    tag = "Admin",
    summary = "Register a user",
    request_body = NewUserRequest,
    responses(
        (status = 201, description = "User registered", body = UserDto),
        (status = 400, description = "Invalid fields", body = ErrorResponse),
    )
)]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<NewUserRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let user = state.user_service.register(&req.name, &req.email).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

/// Administrator routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/admin/events/{eventId}", patch(moderate_event))
        .route("/admin/users", post(register_user))
}
