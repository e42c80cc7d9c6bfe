//! Output shapes the LLM is asked to produce.
//!
//! These are the only two shapes the structured-output adapter knows; their
//! JSON schemas are derived with `schemars` and sent to providers that
//! support schema-constrained output.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Generated project files with an explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeGenerationOutput {
    /// Generated files with filename as key and content as value
    pub files: BTreeMap<String, String>,
    /// Brief explanation of what was created
    pub explanation: String,
    /// Suggestions for improvements
    #[serde(default)]
    pub suggestions: Vec<String>,
}

/// Verdict on a set of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CodeValidationOutput {
    /// Whether the code is valid
    #[serde(alias = "isValid")]
    pub is_valid: bool,
    /// Validation errors
    #[serde(default)]
    pub errors: Vec<String>,
    /// Validation warnings
    #[serde(default)]
    pub warnings: Vec<String>,
    /// Suggestions for improvements
    #[serde(default)]
    pub suggestions: Vec<String>,
}
