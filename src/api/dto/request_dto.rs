//! Participation request DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{EventId, ParticipationRequest, RequestId, RequestStatus, UserId};
use crate::service::StatusUpdate;

/// Query string of `POST /users/{userId}/requests`.
#[derive(Debug, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct CreateRequestQuery {
    /// Event to join.
    pub event_id: EventId,
}

/// A participation request as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationRequestDto {
    /// Request identifier.
    pub id: RequestId,
    /// Target event.
    pub event: EventId,
    /// Requesting user.
    pub requester: UserId,
    /// Current status.
    pub status: RequestStatus,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
}

impl From<ParticipationRequest> for ParticipationRequestDto {
    fn from(request: ParticipationRequest) -> Self {
        Self {
            id: request.id,
            event: request.event_id,
            requester: request.requester_id,
            status: request.status,
            created: request.created_at,
        }
    }
}

/// Request body for `PATCH /users/{userId}/events/{eventId}/requests`.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    /// Pending requests to decide, in priority order.
    pub request_ids: Vec<RequestId>,
    /// `CONFIRMED` or `REJECTED`.
    pub status: RequestStatus,
}

/// Response body for `PATCH /users/{userId}/events/{eventId}/requests`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusResponse {
    /// Requests confirmed by the call.
    pub confirmed_requests: Vec<ParticipationRequestDto>,
    /// Requests rejected by the call, including capacity cascades.
    pub rejected_requests: Vec<ParticipationRequestDto>,
}

impl From<StatusUpdate> for UpdateStatusResponse {
    fn from(update: StatusUpdate) -> Self {
        Self {
            confirmed_requests: update.confirmed.into_iter().map(Into::into).collect(),
            rejected_requests: update.rejected.into_iter().map(Into::into).collect(),
        }
    }
}
