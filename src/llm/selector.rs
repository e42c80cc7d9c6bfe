//! Backend selection
//!
//! Picks one provider at startup from the requested name and the available
//! credentials, builds its client, and fixes its structured-output
//! capability for the lifetime of the process.

use std::sync::Arc;

use tracing::info;

use super::{
    AnthropicBackend, BackendError, Credentials, GeminiBackend, LlmBackend, LlmSettings,
    OpenAiCompatibleBackend, ProviderKind,
};
use crate::error::AppError;

/// Requested-provider value meaning "first provider with credentials".
pub const AUTO_PROVIDER: &str = "auto";

/// How structured requests are served for the selected backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Native schema-constrained completions
    Structured,
    /// Schema in the prompt, JSON extracted from free text
    TextOnly,
}

/// Resolves the provider to use, without touching the network.
pub fn resolve_provider(requested: &str, credentials: &Credentials) -> Result<ProviderKind, AppError> {
    let available = credentials.available();

    if available.is_empty() {
        return Err(AppError::Configuration {
            message: "No LLM providers available".to_string(),
            available_providers: Vec::new(),
        });
    }

    if requested.trim().eq_ignore_ascii_case(AUTO_PROVIDER) {
        return Ok(available[0]);
    }

    match ProviderKind::parse(requested) {
        Some(kind) if available.contains(&kind) => Ok(kind),
        _ => {
            let names: Vec<String> = available.iter().map(|k| k.name().to_string()).collect();
            Err(AppError::Configuration {
                message: format!(
                    "Provider {} not available. Available providers: [{}]",
                    requested.trim(),
                    names.join(", ")
                ),
                available_providers: names,
            })
        }
    }
}

/// Resolves the provider and constructs its client.
pub fn select_backend(settings: &LlmSettings) -> Result<BackendHandle, AppError> {
    let kind = resolve_provider(&settings.provider, &settings.credentials)?;
    let api_key = settings.credentials.get(kind).unwrap_or_default();

    let backend: Arc<dyn LlmBackend> = match kind {
        ProviderKind::Gemini => Arc::new(GeminiBackend::new(api_key, settings).map_err(client_error)?),
        ProviderKind::Anthropic => {
            Arc::new(AnthropicBackend::new(api_key, settings).map_err(client_error)?)
        }
        ProviderKind::OpenAi | ProviderKind::DeepSeek => Arc::new(
            OpenAiCompatibleBackend::new(kind, api_key, settings).map_err(client_error)?,
        ),
    };

    let available = settings
        .credentials
        .available()
        .into_iter()
        .map(|k| k.name().to_string())
        .collect();

    let handle = BackendHandle::new(backend, settings.structured_output, available);
    info!(
        provider = handle.current_provider_name(),
        model = %settings.model_for(kind),
        mode = ?handle.mode(),
        "LLM backend selected"
    );
    Ok(handle)
}

fn client_error(err: BackendError) -> AppError {
    AppError::Configuration {
        message: format!("Failed to initialise LLM client: {err}"),
        available_providers: Vec::new(),
    }
}

/// The selected backend plus what was known at selection time.
#[derive(Clone)]
pub struct BackendHandle {
    backend: Arc<dyn LlmBackend>,
    mode: OutputMode,
    available_providers: Vec<String>,
}

impl BackendHandle {
    /// Wraps an already-built backend. The structured mode is only used
    /// when both allowed and supported by the backend.
    pub fn new(backend: Arc<dyn LlmBackend>, allow_structured: bool, available_providers: Vec<String>) -> Self {
        let mode = if allow_structured && backend.supports_structured_output() {
            OutputMode::Structured
        } else {
            OutputMode::TextOnly
        };

        Self {
            backend,
            mode,
            available_providers,
        }
    }

    pub fn backend(&self) -> &Arc<dyn LlmBackend> {
        &self.backend
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    pub fn supports_structured_output(&self) -> bool {
        self.mode == OutputMode::Structured
    }

    pub fn current_provider_name(&self) -> &'static str {
        self.backend.provider_name()
    }

    /// Providers that had credentials at startup, in preference order.
    pub fn list_available_providers(&self) -> &[String] {
        &self.available_providers
    }

    /// Live round-trip to the selected provider.
    pub async fn is_available(&self) -> bool {
        self.backend.check_availability().await
    }
}
