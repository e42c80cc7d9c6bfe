//! Structured-output adapter
//!
//! Produces a typed output from the selected backend. Backends with a native
//! schema-constrained API use it; the rest get the schema appended to the
//! prompt and the JSON object recovered from their free text.

use serde_json::Value;
use tracing::{debug, warn};

use super::extract::extract_json_object;
use super::shape::{OutputShape, StructuredOutput};
use crate::error::{AppError, Result};
use crate::llm::{BackendHandle, GenerationOptions, OutputMode};

#[derive(Clone)]
pub struct StructuredOutputAdapter {
    handle: BackendHandle,
    options: GenerationOptions,
}

impl StructuredOutputAdapter {
    pub fn new(handle: BackendHandle) -> Self {
        Self {
            handle,
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn handle(&self) -> &BackendHandle {
        &self.handle
    }

    /// Generates an instance of `T` for `prompt`.
    ///
    /// Backend trouble surfaces as `AppError::Backend`; a reply that cannot
    /// be read as `T` surfaces as `AppError::Validation`.
    pub async fn generate<T: StructuredOutput>(&self, prompt: &str) -> Result<T> {
        let backend = self.handle.backend();

        let raw = match self.handle.mode() {
            OutputMode::Structured => {
                debug!(provider = backend.provider_name(), shape = T::SHAPE.name(), "Structured generation");
                backend
                    .generate_structured(prompt, T::SHAPE, &self.options)
                    .await?
            }
            OutputMode::TextOnly => {
                debug!(provider = backend.provider_name(), shape = T::SHAPE.name(), "Fallback text generation");
                backend
                    .generate_text(&fallback_prompt(prompt, T::SHAPE), &self.options)
                    .await?
            }
        };

        parse_output(&raw)
    }
}

/// Appends the schema and a JSON-only instruction to `prompt`.
pub fn fallback_prompt(prompt: &str, shape: OutputShape) -> String {
    let schema = serde_json::to_string_pretty(&shape.schema()).unwrap_or_default();
    format!(
        "{prompt}\n\nRespond with a single valid JSON object matching this JSON schema:\n{schema}\n\nReturn only the JSON object, properly escaped, with no extra text."
    )
}

/// Reads `T` out of model text.
pub fn parse_output<T: StructuredOutput>(raw: &str) -> Result<T> {
    let value: Value = extract_json_object(raw).map_err(|reason| {
        warn!(reason = %reason, "Failed to parse structured response");
        AppError::Validation(reason)
    })?;

    serde_json::from_value(value).map_err(|err| {
        warn!(error = %err, "Structured response does not match the expected shape");
        AppError::Validation(format!("Response does not match {}: {err}", T::SHAPE.name()))
    })
}
