//! REST endpoint handlers organized by resource.

pub mod admin;
pub mod events;
pub mod requests;
pub mod system;

use axum::Router;

use crate::app_state::AppState;

/// Composes all resource routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(events::routes())
        .merge(requests::routes())
        .merge(admin::routes())
        .merge(system::routes())
}
