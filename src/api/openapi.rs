//! OpenAPI document for the REST surface.

use utoipa::OpenApi;

use super::dto::{
    EventDto, NewEventRequest, NewUserRequest, ParticipationRequestDto, UpdateEventRequest,
    UpdateStatusRequest, UpdateStatusResponse, UserDto,
};
use super::handlers::{admin, events, requests, system};
use crate::domain::{EventAction, EventState, RequestStatus};
use crate::error::{ErrorBody, ErrorKind, ErrorResponse};

/// Generated OpenAPI specification, served at `/swagger-ui` when the
/// `swagger-ui` feature is enabled.
#[derive(Debug, OpenApi)]
#[openapi(
    info(
        title = "participation-gateway",
        description = "Admission control for capacity-limited events with moderated participation requests."
    ),
    paths(
        events::create_event,
        events::list_events,
        events::get_event,
        events::update_event,
        events::get_published_event,
        requests::create_request,
        requests::list_own_requests,
        requests::cancel_request,
        requests::list_event_requests,
        requests::update_request_statuses,
        admin::moderate_event,
        admin::register_user,
        system::health_handler,
    ),
    components(schemas(
        EventDto,
        NewEventRequest,
        UpdateEventRequest,
        ParticipationRequestDto,
        UpdateStatusRequest,
        UpdateStatusResponse,
        NewUserRequest,
        UserDto,
        EventState,
        EventAction,
        RequestStatus,
        ErrorResponse,
        ErrorBody,
        ErrorKind,
    )),
    tags(
        (name = "Events", description = "Event creation and lifecycle"),
        (name = "Requests", description = "Participation requests and moderation"),
        (name = "Admin", description = "Administrator operations"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/users/{userId}/events",
            "/users/{userId}/events/{eventId}",
            "/users/{userId}/events/{eventId}/requests",
            "/users/{userId}/requests",
            "/users/{userId}/requests/{requestId}/cancel",
            "/admin/events/{eventId}",
            "/admin/users",
            "/events/{eventId}",
            "/health",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
