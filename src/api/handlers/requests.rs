//! Participation request handlers: join, cancel, list and moderate.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    CreateRequestQuery, ParticipationRequestDto, UpdateStatusRequest, UpdateStatusResponse,
};
use crate::api::extract::{ApiJson, ApiPath, ApiQuery};
use crate::app_state::AppState;
use crate::domain::{EventId, RequestId, UserId};
use crate::error::{ErrorResponse, GatewayError};

/// `POST /users/{userId}/requests?eventId=` — Request to join an event.
///
/// # Errors
///
/// Returns [`GatewayError`] on unknown ids or any admission conflict.
#[utoipa::path(
    post,
    path = "/users/{userId}/requests",
    tag = "Requests",
    summary = "Request participation",
    description = "Creates a participation request. It starts CONFIRMED when the event has no moderation or no limit, PENDING otherwise.",
    params(
        ("userId" = uuid::Uuid, Path, description = "Requester UUID"),
        CreateRequestQuery,
    ),
    responses(
        (status = 201, description = "Request created", body = ParticipationRequestDto),
        (status = 400, description = "Missing or malformed eventId", body = ErrorResponse),
        (status = 404, description = "User or event not found", body = ErrorResponse),
        (status = 409, description = "Admission refused", body = ErrorResponse),
    )
)]
pub async fn create_request(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
    ApiQuery(query): ApiQuery<CreateRequestQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = state
        .request_service
        .create(user_id, query.event_id)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ParticipationRequestDto::from(request)),
    ))
}

/// `GET /users/{userId}/requests` — List the user's own requests.
///
/// # Errors
///
/// Returns [`GatewayError::UserNotFound`] for an unknown user.
#[utoipa::path(
    get,
    path = "/users/{userId}/requests",
    tag = "Requests",
    summary = "List own requests",
    params(("userId" = uuid::Uuid, Path, description = "Requester UUID")),
    responses(
        (status = 200, description = "Requests of the user", body = Vec<ParticipationRequestDto>),
        (status = 404, description = "User not found", body = ErrorResponse),
    )
)]
pub async fn list_own_requests(
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<UserId>,
) -> Result<impl IntoResponse, GatewayError> {
    let requests = state.request_service.list_for_requester(user_id).await?;
    let body: Vec<ParticipationRequestDto> = requests.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// `PATCH /users/{userId}/requests/{requestId}/cancel` — Cancel a request.
///
/// # Errors
///
/// Returns [`GatewayError`] on unknown ids or if the request belongs to
/// someone else.
#[utoipa::path(
    patch,
    path = "/users/{userId}/requests/{requestId}/cancel",
    tag = "Requests",
    summary = "Cancel own request",
    description = "Cancels the request. A confirmed request frees its seat. Cancelling twice is a no-op.",
    params(
        ("userId" = uuid::Uuid, Path, description = "Requester UUID"),
        ("requestId" = uuid::Uuid, Path, description = "Request UUID"),
    ),
    responses(
        (status = 200, description = "Canceled request", body = ParticipationRequestDto),
        (status = 404, description = "User or request not found", body = ErrorResponse),
        (status = 409, description = "Not the requester", body = ErrorResponse),
    )
)]
pub async fn cancel_request(
    State(state): State<AppState>,
    ApiPath((user_id, request_id)): ApiPath<(UserId, RequestId)>,
) -> Result<impl IntoResponse, GatewayError> {
    let request = state.request_service.cancel(user_id, request_id).await?;
    Ok(Json(ParticipationRequestDto::from(request)))
}

/// `GET /users/{userId}/events/{eventId}/requests` — List requests of an
/// event the user initiated.
///
/// # Errors
///
/// Returns [`GatewayError`] on unknown ids or if the user is not the
/// initiator.
#[utoipa::path(
    get,
    path = "/users/{userId}/events/{eventId}/requests",
    tag = "Requests",
    summary = "List requests of own event",
    params(
        ("userId" = uuid::Uuid, Path, description = "Initiator UUID"),
        ("eventId" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    responses(
        (status = 200, description = "Requests of the event", body = Vec<ParticipationRequestDto>),
        (status = 404, description = "User or event not found", body = ErrorResponse),
        (status = 409, description = "Not the initiator", body = ErrorResponse),
    )
)]
pub async fn list_event_requests(
    State(state): State<AppState>,
    ApiPath((user_id, event_id)): ApiPath<(UserId, EventId)>,
) -> Result<impl IntoResponse, GatewayError> {
    let requests = state
        .request_service
        .list_for_event(user_id, event_id)
        .await?;
    let body: Vec<ParticipationRequestDto> = requests.into_iter().map(Into::into).collect();
    Ok(Json(body))
}

/// `PATCH /users/{userId}/events/{eventId}/requests` — Confirm or reject
/// pending requests.
///
/// # Errors
///
/// Returns [`GatewayError`] on unknown ids, invalid input, a non-pending
/// target or if the user is not the initiator.
#[utoipa::path(
    patch,
    path = "/users/{userId}/events/{eventId}/requests",
    tag = "Requests",
    summary = "Moderate requests of own event",
    description = "Confirms targets in the given order while seats remain. Once the event is full, remaining targets and all other pending requests are rejected.",
    params(
        ("userId" = uuid::Uuid, Path, description = "Initiator UUID"),
        ("eventId" = uuid::Uuid, Path, description = "Event UUID"),
    ),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Confirmed and rejected requests", body = UpdateStatusResponse),
        (status = 400, description = "Invalid input", body = ErrorResponse),
        (status = 404, description = "User, event or request not found", body = ErrorResponse),
        (status = 409, description = "Not the initiator or request not pending", body = ErrorResponse),
    )
)]
pub async fn update_request_statuses(
    State(state): State<AppState>,
    ApiPath((user_id, event_id)): ApiPath<(UserId, EventId)>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    let update = state
        .request_service
        .update_status(user_id, event_id, &req.request_ids, req.status)
        .await?;
    Ok(Json(UpdateStatusResponse::from(update)))
}

/// Participation request routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{userId}/requests",
            post(create_request).get(list_own_requests),
        )
        .route(
            "/users/{userId}/requests/{requestId}/cancel",
            patch(cancel_request),
        )
        .route(
            "/users/{userId}/events/{eventId}/requests",
            get(list_event_requests).patch(update_request_statuses),
        )
}
