//! API Module
//!
//! HTTP handlers and routing for the code generation REST API.
//!
//! # Endpoints (under `/api/v1`)
//! - `POST /generate` - Generate project files
//! - `POST /generate/validate` - Review project files
//! - `POST /stream` - Stream raw model output as Server-Sent Events
//! - `GET /providers/available` - Providers with credentials
//! - `GET /providers/current` - Selected provider and live availability
//! - `GET /monitoring/health` - Liveness
//! - `GET /monitoring/health/detailed` - Cache and LLM status
//! - `GET|DELETE /monitoring/cache` - Cache diagnostics and reset

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, API_PREFIX};
