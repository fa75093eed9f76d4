//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Every core
//! operation returns it directly; only the [`IntoResponse`] impl at the
//! bottom of this module knows about HTTP.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 2104,
///     "kind": "conflict",
///     "message": "conflict: limit reached"
///   }
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code, kind and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`GatewayError`]).
    pub code: u32,
    /// Error category.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
}

/// Coarse error category, independent of the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced event, request or user does not exist.
    NotFound,
    /// A business rule rejected the operation.
    Conflict,
    /// Malformed caller input.
    Validation,
    /// Concurrency retries were exhausted; the caller may try again.
    Transient,
    /// Anything else.
    Internal,
}

/// Business-rule violations.
///
/// These are deterministic: retrying the same operation against the same
/// state yields the same conflict.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Conflict {
    /// Participation requested for an event that is not published.
    #[error("event not published")]
    EventNotPublished,

    /// The initiator tried to join their own event.
    #[error("cannot request own event")]
    OwnEvent,

    /// A non-canceled request already exists for this requester and event.
    #[error("duplicate request")]
    DuplicateRequest,

    /// The event already holds `participantLimit` confirmed requests.
    #[error("limit reached")]
    LimitReached,

    /// The caller does not own the participation request.
    #[error("not owner")]
    NotOwner,

    /// A targeted request is no longer pending.
    #[error("request not pending")]
    RequestNotPending,

    /// The caller is not the event initiator.
    #[error("not initiator")]
    NotInitiator,

    /// Publish or reject attempted on an event that is not pending.
    #[error("event not pending")]
    EventNotPending,

    /// The requested lifecycle action is not allowed from the current state.
    #[error("cannot {action} an event in state {state}")]
    InvalidTransition {
        /// Current event state.
        state: String,
        /// Attempted action.
        action: String,
    },

    /// The event starts too soon for the edit being made.
    #[error("event date too close")]
    EventDateTooClose,

    /// Users may only edit pending or canceled events.
    #[error("published event cannot be changed")]
    EventAlreadyPublished,

    /// The new participant limit is below the number already confirmed.
    #[error("participant limit below confirmed count")]
    LimitBelowConfirmed,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category    | HTTP Status                |
/// |-----------|-------------|----------------------------|
/// | 1000–1999 | Validation  | 400 Bad Request            |
/// | 2000–2099 | Not Found   | 404 Not Found              |
/// | 2100–2199 | Conflict    | 409 Conflict               |
/// | 3000–3999 | Server      | 500 / 503                  |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Event with the given ID was not found.
    #[error("event not found: {0}")]
    EventNotFound(uuid::Uuid),

    /// Participation request with the given ID was not found.
    #[error("participation request not found: {0}")]
    RequestNotFound(uuid::Uuid),

    /// User with the given ID was not found.
    #[error("user not found: {0}")]
    UserNotFound(uuid::Uuid),

    /// A business rule rejected the operation.
    #[error("conflict: {0}")]
    Conflict(#[from] Conflict),

    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// A write kept colliding with concurrent writers.
    #[error("transient failure after {attempts} attempts; retry later")]
    Transient {
        /// How many attempts were made before giving up.
        attempts: u32,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the error category for this variant.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::EventNotFound(_) | Self::RequestNotFound(_) | Self::UserNotFound(_) => {
                ErrorKind::NotFound
            }
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::InvalidRequest(_) => ErrorKind::Validation,
            Self::Transient { .. } => ErrorKind::Transient,
            Self::PersistenceError(_) | Self::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::EventNotFound(_) => 2001,
            Self::RequestNotFound(_) => 2002,
            Self::UserNotFound(_) => 2003,
            Self::Conflict(conflict) => match conflict {
                Conflict::EventNotPublished => 2101,
                Conflict::OwnEvent => 2102,
                Conflict::DuplicateRequest => 2103,
                Conflict::LimitReached => 2104,
                Conflict::NotOwner => 2105,
                Conflict::RequestNotPending => 2106,
                Conflict::NotInitiator => 2107,
                Conflict::EventNotPending => 2108,
                Conflict::InvalidTransition { .. } => 2109,
                Conflict::EventDateTooClose => 2110,
                Conflict::EventAlreadyPublished => 2111,
                Conflict::LimitBelowConfirmed => 2112,
            },
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::Transient { .. } => 3002,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Transient => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for GatewayError {
    fn from(err: sqlx::Error) -> Self {
        Self::PersistenceError(err.to_string())
    }
}

impl From<JsonRejection> for GatewayError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for GatewayError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for GatewayError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                kind: self.kind(),
                message: self.to_string(),
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
