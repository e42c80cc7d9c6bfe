//! Response DTOs for the code generation API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::Framework;
use super::outputs::{CodeGenerationOutput, CodeValidationOutput};
use crate::cache::CacheStats;

/// Response body for code generation. This is also the cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateCodeResponse {
    /// Generated files
    pub files: BTreeMap<String, String>,
    /// Explanation of the generated code
    pub explanation: String,
    /// Suggestions for improvements
    #[serde(default)]
    pub suggestions: Vec<String>,
    /// Framework that was used
    pub framework_used: Framework,
}

impl GenerateCodeResponse {
    pub fn from_output(output: CodeGenerationOutput, framework: Framework) -> Self {
        Self {
            files: output.files,
            explanation: output.explanation,
            suggestions: output.suggestions,
            framework_used: framework,
        }
    }
}

/// Response body for code validation. This is also the cached value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateCodeResponse {
    pub is_valid: bool,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

impl From<CodeValidationOutput> for ValidateCodeResponse {
    fn from(output: CodeValidationOutput) -> Self {
        Self {
            is_valid: output.is_valid,
            errors: output.errors,
            warnings: output.warnings,
            suggestions: output.suggestions,
        }
    }
}

/// One Server-Sent Event payload of the streaming endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Chunk { content: String },
    Done,
    Error { message: String },
}

/// Response body for `GET /api/v1/providers/current`
#[derive(Debug, Clone, Serialize)]
pub struct CurrentProviderResponse {
    pub provider: String,
    pub available: bool,
    pub structured_output: bool,
}

/// Response body for the cache diagnostics endpoint
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatsResponse {
    pub backend: String,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub total_entries: usize,
    pub capacity: Option<usize>,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Share of capacity in use, for bounded stores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub utilization: Option<f64>,
}

impl CacheStatsResponse {
    pub fn new(backend: impl Into<String>, stats: &CacheStats) -> Self {
        Self {
            backend: backend.into(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            expirations: stats.expirations,
            total_entries: stats.total_entries,
            capacity: stats.capacity,
            hit_rate: stats.hit_rate(),
            utilization: stats.utilization(),
        }
    }
}

/// Response body for the health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
    pub version: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Status of one dependency in the detailed health report
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_providers: Option<Vec<String>>,
}

impl ServiceStatus {
    pub fn from_health(healthy: bool) -> Self {
        Self {
            status: if healthy { "healthy" } else { "unhealthy" }.to_string(),
            backend: None,
            provider: None,
            available_providers: None,
        }
    }
}

/// Response body for the detailed health endpoint
#[derive(Debug, Clone, Serialize)]
pub struct DetailedHealthResponse {
    /// "healthy" when every dependency is, "degraded" otherwise
    pub status: String,
    pub timestamp: String,
    pub cache: ServiceStatus,
    pub llm: ServiceStatus,
}

impl DetailedHealthResponse {
    pub fn new(cache: ServiceStatus, llm: ServiceStatus) -> Self {
        let all_healthy = cache.status == "healthy" && llm.status == "healthy";
        Self {
            status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            cache,
            llm,
        }
    }
}
