//! API Handlers
//!
//! HTTP request handlers for each endpoint. Handlers stay thin: they unpack
//! the request, call the orchestrator, and shape the response.

use std::convert::Infallible;

use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    Json,
};
use futures::{stream, Stream, StreamExt};
use serde_json::json;
use tracing::{info, warn};

use crate::error::{ApiError, AppError};
use crate::models::{
    CacheStatsResponse, CurrentProviderResponse, DetailedHealthResponse, GenerateCodeRequest,
    GenerateCodeResponse, HealthResponse, ServiceStatus, StreamEvent, ValidateCodeRequest,
    ValidateCodeResponse,
};
use crate::service::{CodeGenerationService, CodeStream};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: CodeGenerationService,
    /// Expose internal error detail to clients
    pub debug: bool,
}

impl AppState {
    pub fn new(service: CodeGenerationService, debug: bool) -> Self {
        Self { service, debug }
    }

    fn error(&self, error: AppError) -> ApiError {
        ApiError::new(error, self.debug)
    }
}

/// Handler for POST /api/v1/generate
pub async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Result<Json<GenerateCodeResponse>, ApiError> {
    state
        .service
        .generate_code(req)
        .await
        .map(Json)
        .map_err(|err| state.error(err))
}

/// Handler for POST /api/v1/generate/validate
pub async fn validate_handler(
    State(state): State<AppState>,
    Json(req): Json<ValidateCodeRequest>,
) -> Result<Json<ValidateCodeResponse>, ApiError> {
    state
        .service
        .validate_code(req)
        .await
        .map(Json)
        .map_err(|err| state.error(err))
}

/// Handler for POST /api/v1/stream
///
/// Malformed requests are rejected with a status code; anything that goes
/// wrong after that is reported as a single `error` event.
pub async fn stream_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateCodeRequest>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let chunks: CodeStream = match state.service.generate_code_stream(req).await {
        Ok(chunks) => chunks,
        Err(err @ AppError::InvalidRequest(_)) => return Err(state.error(err)),
        Err(err) => Box::pin(stream::once(async move { Err::<String, AppError>(err) })),
    };

    Ok(Sse::new(stream_events(chunks, state.debug)).keep_alive(KeepAlive::default()))
}

/// Relays chunks as `chunk` events, then one `done` or `error` event.
fn stream_events(chunks: CodeStream, debug: bool) -> impl Stream<Item = Result<Event, Infallible>> {
    stream::unfold(Some(chunks), move |state| async move {
        let mut chunks = state?;
        let last = match chunks.next().await {
            Some(Ok(content)) => return Some((StreamEvent::Chunk { content }, Some(chunks))),
            Some(Err(err)) => {
                warn!(error = %err, "Streaming generation failed");
                StreamEvent::Error {
                    message: err.public_message(debug),
                }
            }
            None => {
                info!("Streaming generation finished");
                StreamEvent::Done
            }
        };
        Some((last, None))
    })
    .map(|event| Ok(Event::default().data(serde_json::to_string(&event).unwrap_or_default())))
}

/// Handler for GET /api/v1/providers/available
pub async fn available_providers_handler(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.service.handle().list_available_providers().to_vec())
}

/// Handler for GET /api/v1/providers/current
pub async fn current_provider_handler(State(state): State<AppState>) -> Json<CurrentProviderResponse> {
    let handle = state.service.handle();

    Json(CurrentProviderResponse {
        provider: handle.current_provider_name().to_string(),
        available: handle.is_available().await,
        structured_output: handle.supports_structured_output(),
    })
}

/// Handler for GET /api/v1/monitoring/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for GET /api/v1/monitoring/health/detailed
pub async fn detailed_health_handler(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let cache = state.service.cache();
    let handle = state.service.handle();

    let mut cache_status = ServiceStatus::from_health(cache.stats().await.is_some());
    cache_status.backend = Some(cache.backend_name().to_string());

    let mut llm_status = ServiceStatus::from_health(handle.is_available().await);
    llm_status.provider = Some(handle.current_provider_name().to_string());
    llm_status.available_providers = Some(handle.list_available_providers().to_vec());

    Json(DetailedHealthResponse::new(cache_status, llm_status))
}

/// Handler for GET /api/v1/monitoring/cache
pub async fn cache_stats_handler(State(state): State<AppState>) -> Response {
    let cache = state.service.cache();

    match cache.stats().await {
        Some(stats) => Json(CacheStatsResponse::new(cache.backend_name(), &stats)).into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "error": "Cache statistics unavailable",
                "backend": cache.backend_name(),
            })),
        )
            .into_response(),
    }
}

/// Handler for DELETE /api/v1/monitoring/cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> StatusCode {
    state.service.cache().clear().await;
    info!("Cache cleared via API");
    StatusCode::NO_CONTENT
}
