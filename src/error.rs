//! Error types for the code generation service
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm::BackendError;

// == Application Error Enum ==
/// Failure categories surfaced by the orchestrator.
#[derive(Error, Debug)]
pub enum AppError {
    /// No usable LLM backend at startup
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        available_providers: Vec<String>,
    },

    /// Provider unavailable, erroring, timed out, or failed mid-stream
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// Provider answered, but the payload is not well-formed output
    #[error("Invalid model output: {0}")]
    Validation(String),

    /// Client sent a malformed request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl AppError {
    /// Short machine-readable category name.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Configuration { .. } => "configuration_failure",
            AppError::Backend(_) => "backend_failure",
            AppError::Validation(_) => "validation_failure",
            AppError::InvalidRequest(_) => "invalid_request",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Configuration { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Backend(_) => StatusCode::BAD_GATEWAY,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show a client. Internal detail is only exposed in
    /// debug mode; request errors are always the caller's own input.
    pub fn public_message(&self, debug: bool) -> String {
        if debug {
            return self.to_string();
        }
        match self {
            AppError::Configuration { .. } => "No LLM provider is configured".to_string(),
            AppError::Backend(_) => "The LLM provider request failed".to_string(),
            AppError::Validation(_) => "The LLM returned malformed output".to_string(),
            AppError::InvalidRequest(msg) => msg.clone(),
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        AppError::Backend(err.to_string())
    }
}

// == Cache Error Enum ==
/// Failures of a cache backend. These never leave `FailOpenCache`.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Remote store I/O failed
    #[error("Cache backend error: {0}")]
    Backend(String),

    /// Operation exceeded its time budget
    #[error("Cache operation timed out after {0:?}")]
    Timeout(Duration),

    /// Stored value could not be (de)serialised
    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == API Error ==
/// Transport-level wrapper deciding how much of an `AppError` a client sees.
#[derive(Debug)]
pub struct ApiError {
    pub error: AppError,
    pub debug: bool,
}

impl ApiError {
    pub fn new(error: AppError, debug: bool) -> Self {
        Self { error, debug }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.error.public_message(self.debug),
            "kind": self.error.kind(),
        }));

        (self.error.status_code(), body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the service.
pub type Result<T> = std::result::Result<T, AppError>;
