//! Code Generation Service
//!
//! Orchestrates one request: derive the cache key, answer from cache when
//! possible, otherwise build the prompt, run the structured-output adapter
//! under the request time budget, and cache the successful result.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::{Stream, StreamExt};
use tracing::{info, instrument};

use crate::cache::{keys, FailOpenCache, GENERATION_TTL_SECS, VALIDATION_TTL_SECS};
use crate::error::{AppError, Result};
use crate::llm::{BackendHandle, GenerationOptions};
use crate::models::{
    CodeGenerationOutput, CodeValidationOutput, GenerateCodeRequest, GenerateCodeResponse,
    ValidateCodeRequest, ValidateCodeResponse,
};
use crate::prompts::{PromptBuilder, TemplatePromptBuilder};
use crate::structured::{StructuredOutput, StructuredOutputAdapter};

/// Default time budget for one generation or validation.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(90);

/// Text chunks of a streaming generation. An `Err` item ends it.
pub type CodeStream = Pin<Box<dyn Stream<Item = Result<String>> + Send>>;

#[derive(Clone)]
pub struct CodeGenerationService {
    adapter: StructuredOutputAdapter,
    cache: FailOpenCache,
    prompts: Arc<dyn PromptBuilder>,
    request_timeout: Duration,
}

impl CodeGenerationService {
    pub fn new(handle: BackendHandle, cache: FailOpenCache) -> Self {
        Self {
            adapter: StructuredOutputAdapter::new(handle),
            cache,
            prompts: Arc::new(TemplatePromptBuilder),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_prompt_builder(mut self, prompts: Arc<dyn PromptBuilder>) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }

    pub fn handle(&self) -> &BackendHandle {
        self.adapter.handle()
    }

    pub fn cache(&self) -> &FailOpenCache {
        &self.cache
    }

    /// Generates project files for a request, answering from cache when an
    /// equivalent request was served within the last hour.
    #[instrument(skip_all, fields(framework = %request.framework))]
    pub async fn generate_code(&self, request: GenerateCodeRequest) -> Result<GenerateCodeResponse> {
        let request = request.normalize();
        if let Some(reason) = request.validate() {
            return Err(AppError::InvalidRequest(reason));
        }

        let key = keys::generation_request_key(&request);
        if let Some(cached) = self.cache.get_json::<GenerateCodeResponse>(&key).await {
            info!(key = %key, "Returning cached code generation");
            return Ok(cached);
        }

        let prompt = self.prompts.build_generation_prompt(&request);
        let output: CodeGenerationOutput = self.run_structured(&prompt).await?;
        let response = GenerateCodeResponse::from_output(output, request.framework);

        self.cache.set_json(&key, &response, GENERATION_TTL_SECS).await;
        info!(key = %key, files = response.files.len(), "Code generation completed");
        Ok(response)
    }

    /// Reviews a set of files. Verdicts, including negative ones, are
    /// cached for half an hour.
    #[instrument(skip_all, fields(framework = %request.framework, files = request.files.len()))]
    pub async fn validate_code(&self, request: ValidateCodeRequest) -> Result<ValidateCodeResponse> {
        if let Some(reason) = request.validate() {
            return Err(AppError::InvalidRequest(reason));
        }

        let key = keys::validation_request_key(&request);
        if let Some(cached) = self.cache.get_json::<ValidateCodeResponse>(&key).await {
            info!(key = %key, "Returning cached code validation");
            return Ok(cached);
        }

        let prompt = self.prompts.build_validation_prompt(&request);
        let output: CodeValidationOutput = self.run_structured(&prompt).await?;
        let response = ValidateCodeResponse::from(output);

        self.cache.set_json(&key, &response, VALIDATION_TTL_SECS).await;
        info!(key = %key, is_valid = response.is_valid, "Code validation completed");
        Ok(response)
    }

    /// Streams raw model text for a generation request. Never cached.
    #[instrument(skip_all, fields(framework = %request.framework))]
    pub async fn generate_code_stream(&self, request: GenerateCodeRequest) -> Result<CodeStream> {
        let request = request.normalize();
        if let Some(reason) = request.validate() {
            return Err(AppError::InvalidRequest(reason));
        }

        let prompt = self.prompts.build_generation_prompt(&request);
        let backend = self.handle().backend();

        let opened = tokio::time::timeout(
            self.request_timeout,
            backend.generate_text_stream(&prompt, &GenerationOptions::default()),
        )
        .await
        .map_err(|_| self.timeout_error())??;

        info!(provider = backend.provider_name(), "Streaming generation started");
        Ok(Box::pin(opened.map(|chunk| chunk.map_err(AppError::from))))
    }

    async fn run_structured<T: StructuredOutput>(&self, prompt: &str) -> Result<T> {
        tokio::time::timeout(self.request_timeout, self.adapter.generate::<T>(prompt))
            .await
            .map_err(|_| self.timeout_error())?
    }

    fn timeout_error(&self) -> AppError {
        AppError::Backend(format!(
            "{} did not answer within {}s",
            self.handle().current_provider_name(),
            self.request_timeout.as_secs()
        ))
    }
}
