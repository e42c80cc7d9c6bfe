//! The output shapes a backend can be asked for.

use schemars::schema_for;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::models::{CodeGenerationOutput, CodeValidationOutput};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputShape {
    CodeGeneration,
    CodeValidation,
}

impl OutputShape {
    /// Schema name sent to providers that accept one.
    pub fn name(self) -> &'static str {
        match self {
            OutputShape::CodeGeneration => "code_generation",
            OutputShape::CodeValidation => "code_validation",
        }
    }

    /// JSON schema of the shape, without the `$schema` meta key.
    pub fn schema(self) -> Value {
        let root = match self {
            OutputShape::CodeGeneration => schema_for!(CodeGenerationOutput),
            OutputShape::CodeValidation => schema_for!(CodeValidationOutput),
        };

        let mut schema = serde_json::to_value(root).unwrap_or_else(|_| json!({"type": "object"}));
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
        }
        schema
    }
}

/// A type the structured-output adapter can produce.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    const SHAPE: OutputShape;
}

impl StructuredOutput for CodeGenerationOutput {
    const SHAPE: OutputShape = OutputShape::CodeGeneration;
}

impl StructuredOutput for CodeValidationOutput {
    const SHAPE: OutputShape = OutputShape::CodeValidation;
}
