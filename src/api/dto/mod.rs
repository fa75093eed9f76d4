//! Data Transfer Objects for REST request/response serialization.
//!
//! Field names are camelCase on the wire; statuses, states and state
//! actions use their SCREAMING_SNAKE_CASE names.

pub mod event_dto;
pub mod request_dto;
pub mod user_dto;

pub use event_dto::*;
pub use request_dto::*;
pub use user_dto::*;
