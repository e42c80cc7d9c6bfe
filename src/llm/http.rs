//! HTTP plumbing shared by the provider clients.

use std::time::Duration;

use futures::{Stream, StreamExt};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::{sse, BackendError, TextStream};

/// Builds the pooled client every backend uses.
pub(crate) fn build_client(provider: &'static str, timeout: Duration) -> Result<Client, BackendError> {
    Client::builder()
        .timeout(timeout)
        .pool_idle_timeout(Some(Duration::from_secs(90)))
        .build()
        .map_err(|source| BackendError::Http { provider, source })
}

/// Sends the request and returns the response if the status is a success.
pub(crate) async fn send(provider: &'static str, request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|source| BackendError::Http { provider, source })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Status {
        provider,
        status: status.as_u16(),
        body: truncate(&body, 500),
    })
}

/// Sends the request and decodes a JSON body.
pub(crate) async fn send_json(provider: &'static str, request: RequestBuilder) -> Result<Value, BackendError> {
    send(provider, request)
        .await?
        .json()
        .await
        .map_err(|source| BackendError::Http { provider, source })
}

/// Opens an SSE response and maps each event through `extract`.
///
/// `extract` returns `None` for events that carry no text, and an error for
/// events that report a provider-side failure.
pub(crate) async fn send_sse<F>(
    provider: &'static str,
    request: RequestBuilder,
    extract: F,
) -> Result<TextStream, BackendError>
where
    F: Fn(&Value) -> Option<Result<String, BackendError>> + Send + 'static,
{
    let response = send(provider, request.header("accept", "text/event-stream")).await?;
    let events = sse::decode_events(provider, response.bytes_stream());
    Ok(Box::pin(text_deltas(events, extract)))
}

fn text_deltas<S, F>(events: S, extract: F) -> impl Stream<Item = Result<String, BackendError>> + Send
where
    S: Stream<Item = Result<Value, BackendError>> + Send,
    F: Fn(&Value) -> Option<Result<String, BackendError>> + Send + 'static,
{
    events
        .filter_map(move |event| {
            let item = match event {
                Ok(value) => extract(&value).filter(|delta| !matches!(delta, Ok(text) if text.is_empty())),
                Err(err) => Some(Err(err)),
            };
            futures::future::ready(item)
        })
        // Nothing is yielded after the first error
        .scan(false, |failed, item| {
            if *failed {
                return futures::future::ready(None);
            }
            *failed = item.is_err();
            futures::future::ready(Some(item))
        })
}

/// Reads a string at a JSON pointer, or reports which field was missing.
pub(crate) fn text_at(provider: &'static str, body: &Value, pointer: &str) -> Result<String, BackendError> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BackendError::decode(provider, format!("missing {pointer} in response")))
}

pub(crate) fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
