//! Route table of the cartnotify API.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::services::IngestService;
use crate::state::AppState;

/// Build the application router with all routes.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Health check routes
    let health_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        .with_state(state.clone());

    // Ingest routes; other methods answer 400 rather than axum's 405
    let ingest_routes = Router::new()
        .route(
            "/api/v1/event",
            post(handlers::ingest_event).fallback(handlers::invalid_method),
        )
        .with_state(IngestService::new(state.store.clone()));

    Router::new()
        .merge(health_routes)
        .merge(ingest_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
