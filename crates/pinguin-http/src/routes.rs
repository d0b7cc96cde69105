use axum::http::{HeaderValue, Method};
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the admin HTTP surface. `allowed_origins` empty means same-origin
/// only; non-empty enables CORS with credentials for exactly those origins,
/// matching the wire contract's CORS rule.
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/runtime-config", get(handlers::runtime_config))
        .route("/healthz", get(handlers::healthz))
        .route("/api/notifications", get(handlers::list_notifications))
        .route(
            "/api/notifications/{id}/schedule",
            patch(handlers::reschedule_notification),
        )
        .route(
            "/api/notifications/{id}/cancel",
            post(handlers::cancel_notification),
        )
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.is_empty() {
        return CorsLayer::new();
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::PATCH, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE, axum::http::header::AUTHORIZATION])
}
