//! LLM Backends
//!
//! A common async interface over the supported providers, the HTTP clients
//! that implement it, and the selector that picks one at startup.

mod anthropic;
mod error;
mod gemini;
mod http;
mod openai;
mod provider;
mod selector;
mod sse;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use tracing::warn;

use crate::structured::OutputShape;

pub use anthropic::AnthropicBackend;
pub use error::BackendError;
pub use gemini::GeminiBackend;
pub use openai::OpenAiCompatibleBackend;
pub use provider::{Credentials, LlmSettings, ProviderKind};
pub use selector::{resolve_provider, select_backend, BackendHandle, OutputMode};

/// Incremental text output of a backend. Finite, not restartable; an `Err`
/// item ends the sequence. Dropping it closes the underlying connection.
pub type TextStream = Pin<Box<dyn Stream<Item = Result<String, BackendError>> + Send>>;

/// Per-call overrides of the backend's configured defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// An interchangeable LLM provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Provider name, e.g. `"openai"`.
    fn provider_name(&self) -> &'static str;

    /// Whether `generate_structured` is backed by a native
    /// schema-constrained API. Read once, when the backend is selected.
    fn supports_structured_output(&self) -> bool {
        false
    }

    /// Plain text completion.
    async fn generate_text(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, BackendError>;

    /// Streaming text completion.
    async fn generate_text_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, BackendError>;

    /// Completion constrained to `shape`; returns the raw JSON text.
    async fn generate_structured(
        &self,
        _prompt: &str,
        _shape: OutputShape,
        _options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        Err(BackendError::Unsupported {
            provider: self.provider_name(),
        })
    }

    /// Cheap live round-trip. Never fails: any error reads as unavailable.
    async fn check_availability(&self) -> bool {
        match self.generate_text("Hello", &GenerationOptions::default()).await {
            Ok(text) => !text.trim().is_empty(),
            Err(err) => {
                warn!(provider = self.provider_name(), error = %err, "LLM availability check failed");
                false
            }
        }
    }
}
