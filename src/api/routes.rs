//! API Routes
//!
//! Configures the Axum router with every endpoint under `/api/v1`.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    available_providers_handler, cache_stats_handler, clear_cache_handler,
    current_provider_handler, detailed_health_handler, generate_handler, health_handler,
    stream_handler, validate_handler, AppState,
};

/// Prefix shared by every route
pub const API_PREFIX: &str = "/api/v1";

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: any origin, method and header
/// - Tracing: one span per request
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/generate", post(generate_handler))
        .route("/generate/validate", post(validate_handler))
        .route("/stream", post(stream_handler))
        .route("/providers/available", get(available_providers_handler))
        .route("/providers/current", get(current_provider_handler))
        .route("/monitoring/health", get(health_handler))
        .route("/monitoring/health/detailed", get(detailed_health_handler))
        .route(
            "/monitoring/cache",
            get(cache_stats_handler).delete(clear_cache_handler),
        );

    Router::new()
        .nest(API_PREFIX, api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
