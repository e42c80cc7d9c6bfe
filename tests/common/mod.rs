//! Shared helpers for integration tests: a scripted LLM backend and
//! service builders around it.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::{stream, StreamExt};

use llm_codegen::cache::{FailOpenCache, MemoryCache};
use llm_codegen::llm::{BackendError, BackendHandle, GenerationOptions, LlmBackend, TextStream};
use llm_codegen::structured::OutputShape;
use llm_codegen::CodeGenerationService;

pub const PROVIDER: &str = "scripted";

/// One scripted answer to a non-streaming call.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Hang,
}

/// One scripted item of a streaming call.
#[derive(Debug, Clone)]
pub enum Chunk {
    Text(String),
    Fail(String),
}

/// Backend that answers from a script and records what it was asked.
pub struct ScriptedBackend {
    structured: bool,
    replies: Mutex<VecDeque<Reply>>,
    chunks: Mutex<Vec<Chunk>>,
    stream_stays_open: AtomicBool,
    stream_dropped: Arc<AtomicBool>,
    calls: AtomicUsize,
    log: Mutex<Vec<(&'static str, String)>>,
}

impl ScriptedBackend {
    pub fn new(structured: bool) -> Self {
        Self {
            structured,
            replies: Mutex::new(VecDeque::new()),
            chunks: Mutex::new(Vec::new()),
            stream_stays_open: AtomicBool::new(false),
            stream_dropped: Arc::new(AtomicBool::new(false)),
            calls: AtomicUsize::new(0),
            log: Mutex::new(Vec::new()),
        }
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.replies.lock().unwrap().push_back(reply);
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.reply(Reply::Text(text.into()))
    }

    pub fn stream(self, chunks: Vec<Chunk>) -> Self {
        *self.chunks.lock().unwrap() = chunks;
        self
    }

    /// After the scripted chunks the stream waits forever instead of ending,
    /// like a provider that is still generating.
    pub fn keep_stream_open(self) -> Self {
        self.stream_stays_open.store(true, Ordering::SeqCst);
        self
    }

    /// Whether the last stream handed out has been dropped.
    pub fn stream_dropped(&self) -> bool {
        self.stream_dropped.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(method, prompt)` for every call, in order.
    pub fn log(&self) -> Vec<(&'static str, String)> {
        self.log.lock().unwrap().clone()
    }

    async fn answer(&self, method: &'static str, prompt: &str) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push((method, prompt.to_string()));

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Reply::Text(text)) => Ok(text),
            Some(Reply::Fail(body)) => Err(BackendError::Status {
                provider: PROVIDER,
                status: 500,
                body,
            }),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(BackendError::Status {
                provider: PROVIDER,
                status: 500,
                body: "script exhausted".to_string(),
            }),
        }
    }
}

/// Raises its flag when the stream that owns it is dropped.
struct DropFlag(Arc<AtomicBool>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LlmBackend for ScriptedBackend {
    fn provider_name(&self) -> &'static str {
        PROVIDER
    }

    fn supports_structured_output(&self) -> bool {
        self.structured
    }

    async fn generate_text(&self, prompt: &str, _options: &GenerationOptions) -> Result<String, BackendError> {
        self.answer("text", prompt).await
    }

    async fn generate_text_stream(
        &self,
        prompt: &str,
        _options: &GenerationOptions,
    ) -> Result<TextStream, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(("stream", prompt.to_string()));

        let items: Vec<Result<String, BackendError>> = self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .map(|chunk| match chunk {
                Chunk::Text(text) => Ok(text.clone()),
                Chunk::Fail(message) => Err(BackendError::stream(PROVIDER, message.clone())),
            })
            .collect();

        let tail: stream::BoxStream<'static, Result<String, BackendError>> = if self.stream_stays_open.load(Ordering::SeqCst) {
            stream::pending().boxed()
        } else {
            stream::empty().boxed()
        };

        self.stream_dropped.store(false, Ordering::SeqCst);
        let guard = DropFlag(self.stream_dropped.clone());
        Ok(Box::pin(stream::iter(items).chain(tail).map(move |item| {
            let _held = &guard;
            item
        })))
    }

    async fn generate_structured(
        &self,
        prompt: &str,
        _shape: OutputShape,
        _options: &GenerationOptions,
    ) -> Result<String, BackendError> {
        if !self.structured {
            return Err(BackendError::Unsupported { provider: PROVIDER });
        }
        self.answer("structured", prompt).await
    }
}

pub fn handle_for(backend: &Arc<ScriptedBackend>) -> BackendHandle {
    BackendHandle::new(backend.clone(), true, vec![PROVIDER.to_string()])
}

/// Service over `backend` with a fresh in-memory cache.
pub fn service_for(backend: &Arc<ScriptedBackend>) -> (CodeGenerationService, MemoryCache) {
    let memory = MemoryCache::new(100);
    let cache = FailOpenCache::new(Arc::new(memory.clone()));
    (CodeGenerationService::new(handle_for(backend), cache), memory)
}

pub const GENERATION_JSON: &str =
    r#"{"files":{"src/App.tsx":"export default function App() { return null; }"},"explanation":"A todo app","suggestions":["Add tests"]}"#;

pub const VALID_VERDICT_JSON: &str = r#"{"is_valid":true,"errors":[],"warnings":["unused import"],"suggestions":[]}"#;

pub const INVALID_VERDICT_JSON: &str = r#"{"is_valid":false,"errors":["missing export"],"warnings":[],"suggestions":[]}"#;
