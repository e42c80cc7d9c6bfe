//! Configuration Module
//!
//! Handles loading and managing service configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::llm::{Credentials, LlmSettings, ProviderKind};

/// Which cache store backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackendKind {
    Memory,
    Redis,
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

/// Service configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Expose internal error detail in API responses
    pub debug: bool,
    pub log_format: LogFormat,
    /// Maximum number of entries the in-memory cache can hold
    pub max_entries: usize,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    pub cache_backend: CacheBackendKind,
    pub redis_url: String,
    /// Time budget for a single cache operation
    pub cache_op_timeout: Duration,
    /// Time budget for one generation or validation
    pub request_timeout: Duration,
    pub llm: LlmSettings,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3001)
    /// - `DEBUG` - Expose error detail (default: false)
    /// - `LOG_FORMAT` - `text` or `json` (default: text)
    /// - `MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 300)
    /// - `CACHE_BACKEND` - `memory` or `redis` (default: memory)
    /// - `REDIS_URL` - Redis connection URL (default: redis://localhost:6379/0)
    /// - `CACHE_OP_TIMEOUT_MS` - Per cache operation budget (default: 500)
    /// - `REQUEST_TIMEOUT_SECS` - Per request budget (default: 90)
    /// - `LLM_PROVIDER` - Provider name or `auto` (default: gemini)
    /// - `<PROVIDER>_API_KEY`, `<PROVIDER>_MODEL`, `<PROVIDER>_BASE_URL`
    /// - `LLM_TIMEOUT_SECS` (60), `LLM_TEMPERATURE` (0.1), `LLM_MAX_TOKENS` (8192)
    /// - `LLM_STRUCTURED_OUTPUT` - Use native structured output (default: true)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as `from_env`, reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mut llm = LlmSettings {
            provider: lookup("LLM_PROVIDER")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.llm.provider),
            credentials: Credentials::from_lookup(&lookup),
            timeout: parsed(&lookup, "LLM_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.llm.timeout),
            temperature: parsed(&lookup, "LLM_TEMPERATURE").unwrap_or(defaults.llm.temperature),
            max_tokens: parsed(&lookup, "LLM_MAX_TOKENS").unwrap_or(defaults.llm.max_tokens),
            structured_output: lookup("LLM_STRUCTURED_OUTPUT")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.llm.structured_output),
            ..defaults.llm
        };
        for kind in ProviderKind::ALL {
            if let Some(model) = lookup(kind.model_var()).filter(|v| !v.trim().is_empty()) {
                llm.model_overrides.insert(kind, model.trim().to_string());
            }
            if let Some(url) = lookup(kind.base_url_var()).filter(|v| !v.trim().is_empty()) {
                llm.base_url_overrides.insert(kind, url.trim().to_string());
            }
        }

        Self {
            server_port: parsed(&lookup, "SERVER_PORT").unwrap_or(defaults.server_port),
            debug: lookup("DEBUG")
                .and_then(|v| parse_bool(&v))
                .unwrap_or(defaults.debug),
            log_format: match lookup("LOG_FORMAT").as_deref().map(str::trim) {
                Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => defaults.log_format,
            },
            max_entries: parsed(&lookup, "MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cleanup_interval: parsed(&lookup, "CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            cache_backend: match lookup("CACHE_BACKEND").as_deref().map(str::trim) {
                Some(v) if v.eq_ignore_ascii_case("redis") => CacheBackendKind::Redis,
                _ => defaults.cache_backend,
            },
            redis_url: lookup("REDIS_URL")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.redis_url),
            cache_op_timeout: parsed(&lookup, "CACHE_OP_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.cache_op_timeout),
            request_timeout: parsed(&lookup, "REQUEST_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.request_timeout),
            llm,
        }
    }
}

fn parsed<T, F>(lookup: &F, name: &str) -> Option<T>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(name).and_then(|raw| raw.trim().parse().ok())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3001,
            debug: false,
            log_format: LogFormat::Text,
            max_entries: 1000,
            cleanup_interval: 300,
            cache_backend: CacheBackendKind::Memory,
            redis_url: "redis://localhost:6379/0".to_string(),
            cache_op_timeout: Duration::from_millis(500),
            request_timeout: Duration::from_secs(90),
            llm: LlmSettings::default(),
        }
    }
}
