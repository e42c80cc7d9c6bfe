//! Structured Output
//!
//! Output shapes, JSON recovery from free text, and the adapter that turns a
//! backend into a producer of typed outputs.

mod adapter;
pub mod extract;
mod shape;

pub use adapter::{fallback_prompt, parse_output, StructuredOutputAdapter};
pub use extract::{extract_json_object, extract_json_span};
pub use shape::{OutputShape, StructuredOutput};
