//! LLM Codegen - a caching code generation service in front of LLM providers
//!
//! Turns natural-language requests into project files through one of several
//! interchangeable LLM backends, with TTL/LRU result caching and structured
//! output recovery for backends without a native schema mode.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod prompts;
pub mod service;
pub mod structured;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use service::CodeGenerationService;
pub use tasks::spawn_cleanup_task;
