//! Integration tests for the orchestrator: caching, structured output
//! recovery, failure categories and streaming.

mod common;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde_json::Value;

use common::{
    service_for, Chunk, Reply, ScriptedBackend, GENERATION_JSON, INVALID_VERDICT_JSON,
    VALID_VERDICT_JSON,
};
use llm_codegen::cache::{CacheBackend, CacheStats, FailOpenCache, MemoryCache};
use llm_codegen::error::CacheError;
use llm_codegen::llm::{select_backend, LlmSettings};
use llm_codegen::models::{Framework, GenerateCodeRequest, ValidateCodeRequest};
use llm_codegen::{AppError, CodeGenerationService};

fn todo_request() -> GenerateCodeRequest {
    GenerateCodeRequest::new("Build a todo app", Framework::React)
}

fn validate_request() -> ValidateCodeRequest {
    ValidateCodeRequest {
        files: HashMap::from([("src/App.tsx".to_string(), "export default 1;".to_string())]),
        framework: Framework::React,
    }
}

// == Generation caching ==

#[tokio::test]
async fn test_second_identical_request_is_served_from_cache() {
    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON));
    let (service, memory) = service_for(&backend);

    let first = service.generate_code(todo_request()).await.unwrap();
    let second = service.generate_code(todo_request()).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(first.framework_used, Framework::React);
    assert_eq!(first.explanation, "A todo app");
    assert_eq!(backend.calls(), 1);

    let stats = memory.stats().await.unwrap();
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.total_entries, 1);
}

#[tokio::test]
async fn test_prompts_differing_after_first_hundred_chars_share_a_result() {
    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON));
    let (service, _) = service_for(&backend);
    let base = "a".repeat(100);

    service
        .generate_code(GenerateCodeRequest::new(format!("{base} with dark mode"), Framework::React))
        .await
        .unwrap();
    service
        .generate_code(GenerateCodeRequest::new(format!("{base} with light mode"), Framework::React))
        .await
        .unwrap();

    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_different_framework_misses_cache() {
    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON).text(GENERATION_JSON));
    let (service, _) = service_for(&backend);

    service.generate_code(todo_request()).await.unwrap();
    let vue = service
        .generate_code(GenerateCodeRequest::new("Build a todo app", Framework::Vue))
        .await
        .unwrap();

    assert_eq!(vue.framework_used, Framework::Vue);
    assert_eq!(backend.calls(), 2);
}

// == Structured output paths ==

#[tokio::test]
async fn test_structured_backend_uses_native_mode() {
    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON));
    let (service, _) = service_for(&backend);

    service.generate_code(todo_request()).await.unwrap();

    let log = backend.log();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].0, "structured");
    assert!(log[0].1.contains("Build a todo app"));
}

#[tokio::test]
async fn test_text_only_backend_parses_json_out_of_prose() {
    let backend = Arc::new(
        ScriptedBackend::new(false)
            .text(r#"Sure! {"files":{"a.ts":"x"},"explanation":"ok"} hope this helps"#),
    );
    let (service, _) = service_for(&backend);

    let response = service.generate_code(todo_request()).await.unwrap();

    assert_eq!(response.files.get("a.ts").map(String::as_str), Some("x"));
    assert_eq!(response.explanation, "ok");
    assert!(response.suggestions.is_empty());

    let log = backend.log();
    assert_eq!(log[0].0, "text");
    assert!(log[0].1.contains("JSON schema"));
}

#[tokio::test]
async fn test_reply_without_json_is_validation_failure_and_not_cached() {
    let backend = Arc::new(
        ScriptedBackend::new(false)
            .text("I cannot help with that.")
            .text(GENERATION_JSON),
    );
    let (service, memory) = service_for(&backend);

    let err = service.generate_code(todo_request()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert_eq!(memory.stats().await.unwrap().total_entries, 0);

    // The failure was not cached, so the retry reaches the backend again.
    service.generate_code(todo_request()).await.unwrap();
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_empty_reply_is_validation_failure_and_not_cached() {
    let backend = Arc::new(ScriptedBackend::new(false).text(""));
    let (service, memory) = service_for(&backend);

    let err = service.generate_code(todo_request()).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    assert_eq!(backend.log()[0].0, "text");
    assert_eq!(memory.stats().await.unwrap().total_entries, 0);
}

#[tokio::test]
async fn test_empty_structured_reply_is_validation_failure_and_not_cached() {
    let backend = Arc::new(ScriptedBackend::new(true).text(""));
    let (service, memory) = service_for(&backend);

    let err = service.validate_code(validate_request()).await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)), "got {err:?}");
    assert_eq!(backend.log()[0].0, "structured");
    assert_eq!(memory.stats().await.unwrap().total_entries, 0);
}

#[tokio::test]
async fn test_backend_error_is_backend_failure_and_not_cached() {
    let backend = Arc::new(ScriptedBackend::new(true).reply(Reply::Fail("upstream exploded".into())));
    let (service, memory) = service_for(&backend);

    let err = service.generate_code(todo_request()).await.unwrap_err();

    match err {
        AppError::Backend(msg) => assert!(msg.contains("upstream exploded")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(memory.stats().await.unwrap().total_entries, 0);
}

#[tokio::test(start_paused = true)]
async fn test_request_timeout_is_backend_failure() {
    let backend = Arc::new(ScriptedBackend::new(true).reply(Reply::Hang));
    let (service, _) = service_for(&backend);
    let service = service.with_request_timeout(Duration::from_secs(5));

    let err = service.generate_code(todo_request()).await.unwrap_err();

    match err {
        AppError::Backend(msg) => assert!(msg.contains("within 5s")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_prompt_is_rejected_before_backend() {
    let backend = Arc::new(ScriptedBackend::new(true));
    let (service, _) = service_for(&backend);

    let err = service
        .generate_code(GenerateCodeRequest::new("   ", Framework::React))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidRequest(_)));
    assert_eq!(backend.calls(), 0);
}

// == Validation ==

#[tokio::test]
async fn test_validation_verdicts_are_cached() {
    let backend = Arc::new(ScriptedBackend::new(true).text(INVALID_VERDICT_JSON));
    let (service, _) = service_for(&backend);

    let first = service.validate_code(validate_request()).await.unwrap();
    let second = service.validate_code(validate_request()).await.unwrap();

    assert!(!first.is_valid);
    assert_eq!(first.errors, vec!["missing export".to_string()]);
    assert_eq!(first, second);
    assert_eq!(backend.calls(), 1);
}

#[tokio::test]
async fn test_changed_file_content_misses_validation_cache() {
    let backend = Arc::new(
        ScriptedBackend::new(true)
            .text(VALID_VERDICT_JSON)
            .text(INVALID_VERDICT_JSON),
    );
    let (service, _) = service_for(&backend);

    let mut changed = validate_request();
    changed
        .files
        .insert("src/App.tsx".to_string(), "export default 2;".to_string());

    assert!(service.validate_code(validate_request()).await.unwrap().is_valid);
    assert!(!service.validate_code(changed).await.unwrap().is_valid);
    assert_eq!(backend.calls(), 2);
}

#[tokio::test]
async fn test_validation_prompt_includes_files() {
    let backend = Arc::new(ScriptedBackend::new(false).text(VALID_VERDICT_JSON));
    let (service, _) = service_for(&backend);

    service.validate_code(validate_request()).await.unwrap();

    let prompt = &backend.log()[0].1;
    assert!(prompt.contains("--- FILE: src/App.tsx ---"));
    assert!(prompt.contains("export default 1;"));
}

// == Streaming ==

#[tokio::test]
async fn test_stream_relays_chunks_and_bypasses_cache() {
    let backend = Arc::new(
        ScriptedBackend::new(true).stream(vec![Chunk::Text("Hello".into()), Chunk::Text(" world".into())]),
    );
    let (service, memory) = service_for(&backend);

    let chunks: Vec<String> = service
        .generate_code_stream(todo_request())
        .await
        .unwrap()
        .map(|chunk| chunk.unwrap())
        .collect()
        .await;

    assert_eq!(chunks, vec!["Hello", " world"]);
    let stats = memory.stats().await.unwrap();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.hits + stats.misses, 0);
}

#[tokio::test]
async fn test_stream_failure_is_backend_failure() {
    let backend = Arc::new(
        ScriptedBackend::new(true).stream(vec![Chunk::Text("Hel".into()), Chunk::Fail("connection reset".into())]),
    );
    let (service, _) = service_for(&backend);

    let items: Vec<_> = service
        .generate_code_stream(todo_request())
        .await
        .unwrap()
        .collect()
        .await;

    assert_eq!(items.len(), 2);
    assert_eq!(items[0].as_ref().unwrap(), "Hel");
    assert!(matches!(items[1], Err(AppError::Backend(_))));
}

#[tokio::test]
async fn test_dropping_stream_stops_backend_stream() {
    let backend = Arc::new(
        ScriptedBackend::new(true)
            .stream(vec![Chunk::Text("Hello".into())])
            .keep_stream_open(),
    );
    let (service, memory) = service_for(&backend);

    let mut stream = service.generate_code_stream(todo_request()).await.unwrap();
    assert_eq!(stream.next().await.unwrap().unwrap(), "Hello");

    // The provider is still "generating": no further item is ready.
    let pending = tokio::time::timeout(Duration::from_millis(20), stream.next()).await;
    assert!(pending.is_err());
    assert!(!backend.stream_dropped());

    drop(stream);

    assert!(backend.stream_dropped());
    assert_eq!(memory.stats().await.unwrap().total_entries, 0);
}

// == Configuration and cache trouble ==

#[tokio::test]
async fn test_no_credentials_is_configuration_failure() {
    let err = select_backend(&LlmSettings::default()).err().unwrap();

    match err {
        AppError::Configuration {
            available_providers,
            ..
        } => assert!(available_providers.is_empty()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_cache_trouble_never_fails_a_request() {
    /// Cache whose every operation errors.
    struct DownCache;

    #[async_trait::async_trait]
    impl CacheBackend for DownCache {
        fn name(&self) -> &'static str {
            "down"
        }
        async fn get(&self, _: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Backend("down".into()))
        }
        async fn set(&self, _: &str, _: Value, _: u64) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".into()))
        }
        async fn delete(&self, _: &str) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".into()))
        }
        async fn exists(&self, _: &str) -> Result<bool, CacheError> {
            Err(CacheError::Backend("down".into()))
        }
        async fn clear(&self) -> Result<(), CacheError> {
            Err(CacheError::Backend("down".into()))
        }
        async fn stats(&self) -> Result<CacheStats, CacheError> {
            Err(CacheError::Backend("down".into()))
        }
    }

    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON).text(GENERATION_JSON));
    let service = CodeGenerationService::new(
        common::handle_for(&backend),
        FailOpenCache::new(Arc::new(DownCache)),
    );

    service.generate_code(todo_request()).await.unwrap();
    service.generate_code(todo_request()).await.unwrap();

    assert_eq!(backend.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_expired_generation_is_regenerated() {
    let backend = Arc::new(ScriptedBackend::new(true).text(GENERATION_JSON).text(GENERATION_JSON));
    let memory = MemoryCache::new(10);
    let service = CodeGenerationService::new(
        common::handle_for(&backend),
        FailOpenCache::new(Arc::new(memory.clone())),
    );

    service.generate_code(todo_request()).await.unwrap();
    tokio::time::advance(Duration::from_secs(3599)).await;
    service.generate_code(todo_request()).await.unwrap();
    assert_eq!(backend.calls(), 1);

    tokio::time::advance(Duration::from_secs(2)).await;
    service.generate_code(todo_request()).await.unwrap();
    assert_eq!(backend.calls(), 2);
}
