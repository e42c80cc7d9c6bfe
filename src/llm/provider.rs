//! Provider identities, credentials and client settings.

use std::collections::HashMap;
use std::time::Duration;

/// The LLM providers this service can talk to, in preference order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Gemini,
    OpenAi,
    Anthropic,
    DeepSeek,
}

impl ProviderKind {
    /// Every provider, in the order used for `auto` selection and listings.
    pub const ALL: [ProviderKind; 4] = [
        ProviderKind::Gemini,
        ProviderKind::OpenAi,
        ProviderKind::Anthropic,
        ProviderKind::DeepSeek,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::DeepSeek => "deepseek",
        }
    }

    /// Case-insensitive lookup by provider name.
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }

    pub fn default_model(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini-2.5-flash",
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-3-5-sonnet-20241022",
            ProviderKind::DeepSeek => "deepseek-chat",
        }
    }

    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com",
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com",
            ProviderKind::DeepSeek => "https://api.deepseek.com",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_API_KEY",
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::DeepSeek => "DEEPSEEK_API_KEY",
        }
    }

    pub fn model_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_MODEL",
            ProviderKind::OpenAi => "OPENAI_MODEL",
            ProviderKind::Anthropic => "ANTHROPIC_MODEL",
            ProviderKind::DeepSeek => "DEEPSEEK_MODEL",
        }
    }

    pub fn base_url_var(self) -> &'static str {
        match self {
            ProviderKind::Gemini => "GEMINI_BASE_URL",
            ProviderKind::OpenAi => "OPENAI_BASE_URL",
            ProviderKind::Anthropic => "ANTHROPIC_BASE_URL",
            ProviderKind::DeepSeek => "DEEPSEEK_BASE_URL",
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// API keys by provider. Blank keys count as absent.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    keys: HashMap<ProviderKind, String>,
}

impl Credentials {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert; blank keys are ignored.
    pub fn with(mut self, kind: ProviderKind, key: impl Into<String>) -> Self {
        self.insert(kind, key);
        self
    }

    pub fn insert(&mut self, kind: ProviderKind, key: impl Into<String>) {
        let key = key.into();
        if key.trim().is_empty() {
            return;
        }
        self.keys.insert(kind, key.trim().to_string());
    }

    /// Reads every provider's key through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut creds = Self::new();
        for kind in ProviderKind::ALL {
            if let Some(key) = lookup(kind.api_key_var()) {
                creds.insert(kind, key);
            }
        }
        creds
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&str> {
        self.keys.get(&kind).map(String::as_str)
    }

    /// Providers with credentials, in `ProviderKind::ALL` order.
    pub fn available(&self) -> Vec<ProviderKind> {
        ProviderKind::ALL
            .into_iter()
            .filter(|kind| self.keys.contains_key(kind))
            .collect()
    }
}

/// Everything needed to construct a backend client.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Requested provider name, or `auto`
    pub provider: String,
    pub credentials: Credentials,
    pub model_overrides: HashMap<ProviderKind, String>,
    pub base_url_overrides: HashMap<ProviderKind, String>,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// When false, every backend is driven through the text fallback
    pub structured_output: bool,
}

impl LlmSettings {
    pub fn model_for(&self, kind: ProviderKind) -> String {
        self.model_overrides
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| kind.default_model().to_string())
    }

    pub fn base_url_for(&self, kind: ProviderKind) -> String {
        self.base_url_overrides
            .get(&kind)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| kind.default_base_url().to_string())
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Gemini.name().to_string(),
            credentials: Credentials::default(),
            model_overrides: HashMap::new(),
            base_url_overrides: HashMap::new(),
            timeout: Duration::from_secs(60),
            temperature: 0.1,
            max_tokens: 8192,
            structured_output: true,
        }
    }
}
