//! Cache Key Derivation
//!
//! Builds stable fingerprints from the parts of a request that change the
//! answer. Keys are SHA-256 digests of a canonical JSON document, so the
//! same logical request maps to the same key in every process and run.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::models::{GenerateCodeRequest, ValidateCodeRequest};

/// Number of prompt characters that participate in a generation key.
pub const PROMPT_KEY_PREFIX_CHARS: usize = 100;

// == Cache Key ==
/// Opaque, fixed-length (64 hex chars) cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespace tag mixed into every key so generation and validation keys
/// can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyNamespace {
    Prompt,
    Validation,
}

impl KeyNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyNamespace::Prompt => "prompt",
            KeyNamespace::Validation => "validation",
        }
    }
}

// == Derivation ==
/// Key for a generation request.
///
/// Only the first 100 characters of the prompt, the framework, and the
/// *counts* of history messages and current files participate.
pub fn prompt_key(
    prompt: &str,
    framework: &str,
    history_len: usize,
    current_files: usize,
) -> CacheKey {
    let prefix: String = prompt.chars().take(PROMPT_KEY_PREFIX_CHARS).collect();

    let mut params = BTreeMap::new();
    params.insert("prompt", Value::from(prefix));
    params.insert("framework", Value::from(framework));
    params.insert("conversation_history", Value::from(history_len));
    params.insert("current_files", Value::from(current_files));

    derive(KeyNamespace::Prompt, &params)
}

/// Key for a validation request: framework plus a digest of every file,
/// canonicalised by filename so map order never matters.
pub fn validation_key(files: &HashMap<String, String>, framework: &str) -> CacheKey {
    let mut params = BTreeMap::new();
    params.insert("files_hash", Value::from(files_digest(files)));
    params.insert("framework", Value::from(framework));

    derive(KeyNamespace::Validation, &params)
}

pub fn generation_request_key(request: &GenerateCodeRequest) -> CacheKey {
    prompt_key(
        &request.prompt,
        request.framework.as_str(),
        request.conversation_history.len(),
        request.current_files.len(),
    )
}

pub fn validation_request_key(request: &ValidateCodeRequest) -> CacheKey {
    validation_key(&request.files, request.framework.as_str())
}

/// Hex SHA-256 of the files map serialised with sorted filenames.
pub fn files_digest(files: &HashMap<String, String>) -> String {
    let sorted: BTreeMap<&str, &str> = files
        .iter()
        .map(|(name, content)| (name.as_str(), content.as_str()))
        .collect();
    let canonical = serde_json::to_string(&sorted).unwrap_or_default();
    sha256_hex(canonical.as_bytes())
}

fn derive(namespace: KeyNamespace, params: &BTreeMap<&str, Value>) -> CacheKey {
    let canonical = serde_json::to_string(params).unwrap_or_default();
    let material = format!("{}:{}", namespace.as_str(), canonical);
    CacheKey(sha256_hex(material.as_bytes()))
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
