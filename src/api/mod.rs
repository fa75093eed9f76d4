//! REST API layer: route handlers, DTOs, OpenAPI document and router
//! composition.

pub mod dto;
pub mod extract;
pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::Router;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::ws::handler::ws_handler;

/// Builds the router with all REST endpoints, without state or layers.
pub fn build_router() -> Router<AppState> {
    handlers::routes()
}

/// Builds the complete application: REST endpoints, the `/ws` feed,
/// Swagger UI (with the `swagger-ui` feature) and the HTTP middleware.
pub fn build_app(state: AppState, request_timeout: Duration) -> Router {
    let router = build_router().route("/ws", get(ws_handler));

    #[cfg(feature = "swagger-ui")]
    let router = {
        use utoipa::OpenApi;
        router.merge(
            utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", openapi::ApiDoc::openapi()),
        )
    };

    #[allow(deprecated)]
    let timeout = TimeoutLayer::new(request_timeout);

    router
        .layer(timeout)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
