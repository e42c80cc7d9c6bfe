//! Request DTOs for the code generation API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{ConversationMessage, Framework};

/// Request body for code generation (`POST /api/v1/generate`, `/api/v1/stream`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateCodeRequest {
    /// What the user wants built
    pub prompt: String,
    /// Target framework
    pub framework: Framework,
    /// Previous conversation messages, oldest first
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
    /// Files already in the project, filename -> content
    #[serde(default)]
    pub current_files: HashMap<String, String>,
}

impl GenerateCodeRequest {
    pub fn new(prompt: impl Into<String>, framework: Framework) -> Self {
        Self {
            prompt: prompt.into(),
            framework,
            conversation_history: Vec::new(),
            current_files: HashMap::new(),
        }
    }

    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.prompt.trim().is_empty() {
            return Some("Prompt cannot be empty".to_string());
        }
        None
    }

    /// Trims surrounding whitespace from the prompt.
    pub fn normalize(mut self) -> Self {
        let trimmed = self.prompt.trim();
        if trimmed.len() != self.prompt.len() {
            self.prompt = trimmed.to_string();
        }
        self
    }
}

/// Request body for code validation (`POST /api/v1/generate/validate`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateCodeRequest {
    /// Files to validate, filename -> content
    pub files: HashMap<String, String>,
    /// Framework the files are written for
    pub framework: Framework,
}

impl ValidateCodeRequest {
    pub fn validate(&self) -> Option<String> {
        if self.files.is_empty() {
            return Some("At least one file is required".to_string());
        }
        if self.files.keys().any(|name| name.trim().is_empty()) {
            return Some("Filenames cannot be empty".to_string());
        }
        None
    }
}
