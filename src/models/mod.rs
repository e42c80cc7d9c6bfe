//! Request and Response models for the code generation API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies, plus the
//! two output shapes requested from the LLM.

pub mod domain;
pub mod outputs;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use domain::{ConversationMessage, Framework, Role};
pub use outputs::{CodeGenerationOutput, CodeValidationOutput};
pub use requests::{GenerateCodeRequest, ValidateCodeRequest};
pub use responses::{
    CacheStatsResponse, CurrentProviderResponse, DetailedHealthResponse, GenerateCodeResponse,
    HealthResponse, ServiceStatus, StreamEvent, ValidateCodeResponse,
};
