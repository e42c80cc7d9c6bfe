//! Anthropic messages API client. Text only; structured output goes
//! through the prompt-and-extract fallback.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{json, Value};

use super::http::{build_client, send_json, send_sse};
use super::{BackendError, GenerationOptions, LlmBackend, LlmSettings, ProviderKind, TextStream};

const PROVIDER: &str = "anthropic";
const API_VERSION: &str = "2023-06-01";

pub struct AnthropicBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl AnthropicBackend {
    pub fn new(api_key: &str, settings: &LlmSettings) -> Result<Self, BackendError> {
        Ok(Self {
            client: build_client(PROVIDER, settings.timeout)?,
            base_url: settings.base_url_for(ProviderKind::Anthropic),
            api_key: api_key.to_string(),
            model: settings.model_for(ProviderKind::Anthropic),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn request(&self, prompt: &str, options: &GenerationOptions, stream: bool) -> RequestBuilder {
        let body = json!({
            "model": self.model,
            "max_tokens": options.max_tokens.unwrap_or(self.max_tokens),
            "temperature": options.temperature.unwrap_or(self.temperature),
            "messages": [{"role": "user", "content": prompt}],
            "stream": stream,
        });

        self.client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
    }
}

/// Concatenates the text blocks of a messages response.
fn response_text(body: &Value) -> Result<String, BackendError> {
    let blocks = body
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| BackendError::decode(PROVIDER, "missing content in response"))?;

    Ok(blocks
        .iter()
        .filter(|block| block.get("type").and_then(Value::as_str) == Some("text"))
        .filter_map(|block| block.get("text").and_then(Value::as_str))
        .collect())
}

fn stream_delta(event: &Value) -> Option<Result<String, BackendError>> {
    match event.get("type").and_then(Value::as_str)? {
        "content_block_delta" => event
            .pointer("/delta/text")
            .and_then(Value::as_str)
            .map(|text| Ok(text.to_string())),
        "error" => {
            let message = event
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or("unknown stream error");
            Some(Err(BackendError::stream(PROVIDER, message)))
        }
        _ => None,
    }
}

#[async_trait]
impl LlmBackend for AnthropicBackend {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    async fn generate_text(&self, prompt: &str, options: &GenerationOptions) -> Result<String, BackendError> {
        let body = send_json(PROVIDER, self.request(prompt, options, false)).await?;
        response_text(&body)
    }

    async fn generate_text_stream(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<TextStream, BackendError> {
        send_sse(PROVIDER, self.request(prompt, options, true), stream_delta).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    fn backend(server: &mockito::Server) -> AnthropicBackend {
        let mut settings = LlmSettings::default();
        settings
            .base_url_overrides
            .insert(ProviderKind::Anthropic, server.url());
        AnthropicBackend::new("sk-ant-test", &settings).unwrap()
    }

    #[tokio::test]
    async fn test_generate_text_joins_text_blocks() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", "sk-ant-test")
            .match_header("anthropic-version", API_VERSION)
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"Hi "},{"type":"text","text":"there"}]}"#)
            .create_async()
            .await;

        let text = backend(&server)
            .generate_text("Hello", &GenerationOptions::default())
            .await
            .unwrap();

        assert_eq!(text, "Hi there");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_structured_is_unsupported() {
        let server = mockito::Server::new_async().await;
        let backend = backend(&server);

        assert!(!backend.supports_structured_output());
        let err = backend
            .generate_structured(
                "x",
                crate::structured::OutputShape::CodeValidation,
                &GenerationOptions::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Unsupported { provider: "anthropic" }));
    }

    #[tokio::test]
    async fn test_stream_error_event_ends_stream() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(concat!(
                "event: message_start\ndata: {\"type\":\"message_start\"}\n\n",
                "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"delta\":{\"type\":\"text_delta\",\"text\":\"Hel\"}}\n\n",
                "event: error\ndata: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\n",
            ))
            .create_async()
            .await;

        let items: Vec<_> = backend(&server)
            .generate_text_stream("Hello", &GenerationOptions::default())
            .await
            .unwrap()
            .collect()
            .await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), "Hel");
        assert!(items[1].as_ref().unwrap_err().to_string().contains("Overloaded"));
    }
}
