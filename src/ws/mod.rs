//! WebSocket layer: live feed of admission notifications.
//!
//! Clients connect to `/ws`, subscribe to event ids (or `"*"`), and then
//! receive every [`crate::domain::AdmissionEvent`] for those events:
//! request creation, status changes and event lifecycle changes.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
