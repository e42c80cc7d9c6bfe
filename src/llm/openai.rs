//! OpenAI-compatible chat completions client (OpenAI and DeepSeek).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::http::{build_client, send_json, send_sse, text_at};
use super::{BackendError, GenerationOptions, LlmBackend, LlmSettings, ProviderKind, TextStream};
use crate::structured::OutputShape;

pub struct OpenAiCompatibleBackend {
    kind: ProviderKind,
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiCompatibleBackend {
    pub fn new(kind: ProviderKind, api_key: &str, settings: &LlmSettings) -> Result<Self, BackendError> {
        Ok(Self {
            kind,
            client: build_client(kind.name(), settings.timeout)?,
            base_url: settings.base_url_for(kind),
            api_key: api_key.to_string(),
            model: settings.model_for(kind),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn body(&self, prompt: &str, options: &GenerationOptions) -> Value {
        json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": options.temperature.unwrap_or(self.temperature),
            "max_tokens": options.max_tokens.unwrap_or(self.max_tokens),
        })
    }

    async fn complete(&self, body: Value) -> Result<String, BackendError> {
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let response = send_json(self.kind.name(), request).await?;
        message_text(self.kind.name(), &response)
    }
}

/// Content of the first choice. A message whose `content` is null (refusal,
/// length cut-off) counts as an empty answer.
fn message_text(provider: &'static str, response: &Value) -> Result<String, BackendError> {
    match response.pointer("/choices/0/message/content") {
        Some(Value::Null) => Ok(String::new()),
        _ => text_at(provider, response, "/choices/0/message/content"),
    }
}

fn stream_delta(provider: &'static str, event: &Value) -> Option<Result<String, BackendError>> {
    if let Some(message) = event.pointer("/error/message").and_then(Value::as_str) {
        return Some(Err(BackendError::stream(provider, message)));
    }
    event
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .map(|text| Ok(text.to_string()))
}

#[async_trait]
impl LlmBackend for OpenAiCompatibleBackend {
    fn provider_name(&self) -> &'static str {
        self.kind.name()
    }

    fn supports_structured_output(&self) -> bool {
        // DeepSeek only offers unconstrained JSON mode
        self.kind == ProviderKind::OpenAi
    }

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, BackendError> {
        self.complete(self.body(prompt, options)).await
    }

    async fn generate_text_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, BackendError> {
        let mut body = self.body(prompt, options);
        body["stream"] = json!(true);

        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body);

        let provider = self.kind.name();
        send_sse(provider, request, move |event| stream_delta(provider, event)).await
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        shape: OutputShape,
        options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        if !self.supports_structured_output() {
            return Err(BackendError::Unsupported {
                provider: self.kind.name(),
            });
        }

        let mut body = self.body(prompt, options);
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": shape.name(),
                "schema": shape.schema(),
                "strict": false,
            },
        });

        self.complete(body).await
    }
}
