//! Google Gemini `generateContent` client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};
use tracing::warn;

use super::http::{build_client, send_json, send_sse};
use super::{BackendError, GenerationOptions, LlmBackend, LlmSettings, ProviderKind, TextStream};
use crate::structured::OutputShape;

const PROVIDER: &str = "gemini";

pub struct GeminiBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiBackend {
    pub fn new(api_key: &str, settings: &LlmSettings) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(PROVIDER, settings.timeout)?,
            base_url: settings.base_url_for(ProviderKind::Gemini),
            api_key: api_key.to_string(),
            model: settings.model_for(ProviderKind::Gemini),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn body(&self, prompt: &str, options: &GenerationOptions) -> Value {
        json!({
            "contents": [{"role": "user", "parts": [{"text": prompt}]}],
            "generationConfig": {
                "temperature": options.temperature.unwrap_or(self.temperature),
                "maxOutputTokens": options.max_tokens.unwrap_or(self.max_tokens),
            },
        })
    }

    fn request(&self, method: &str, body: &Value) -> RequestBuilder {
        self.client
            .post(format!("{}/v1beta/models/{}:{}", self.base_url, self.model, method))
            .header("x-goog-api-key", &self.api_key)
            .json(body)
    }

    async fn complete(&self, body: Value) -> Result<String, BackendError> {
        let response = send_json(PROVIDER, self.request("generateContent", &body)).await?;
        let text = candidate_text(&response)?
            .ok_or_else(|| BackendError::decode(PROVIDER, block_reason(&response)))?;

        if text.is_empty() {
            warn!(
                provider = PROVIDER,
                finish_reason = finish_reason(&response).unwrap_or("unknown"),
                "Gemini candidate carried no text"
            );
        }
        Ok(text)
    }
}

/// Text of the first candidate, `None` if the response has no candidate.
///
/// A candidate without parts (cut off by `MAX_TOKENS`, `SAFETY`, ...) is an
/// answer with empty text, not a transport failure.
fn candidate_text(body: &Value) -> Result<Option<String>, BackendError> {
    if let Some(message) = body.pointer("/error/message").and_then(Value::as_str) {
        return Err(BackendError::stream(PROVIDER, message));
    }

    let Some(candidate) = body.pointer("/candidates/0") else {
        return Ok(None);
    };

    let text: String = candidate
        .pointer("/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("text").and_then(Value::as_str))
                .collect()
        })
        .unwrap_or_default();
    Ok(Some(text))
}

fn finish_reason(body: &Value) -> Option<&str> {
    body.pointer("/candidates/0/finishReason").and_then(Value::as_str)
}

fn block_reason(body: &Value) -> String {
    match body
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        Some(reason) => format!("prompt blocked: {reason}"),
        None => "response has no candidates".to_string(),
    }
}

fn stream_delta(event: &Value) -> Option<Result<String, BackendError>> {
    candidate_text(event).transpose()
}

#[async_trait]
impl LlmBackend for GeminiBackend {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_structured_output(&self) -> bool {
        true
    }

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, BackendError> {
        self.complete(self.body(prompt, options)).await
    }

    async fn generate_text_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, BackendError> {
        let body = self.body(prompt, options);
        let request = self
            .request("streamGenerateContent", &body)
            .query(&[("alt", "sse")]);

        send_sse(PROVIDER, request, stream_delta).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        shape: OutputShape,
        options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        let mut body = self.body(prompt, options);
        body["generationConfig"]["responseMimeType"] = json!("application/json");
        body["generationConfig"]["responseJsonSchema"] = shape.schema();

        self.complete(body).await
    }
}
