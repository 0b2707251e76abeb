//! LLM configuration parsed from environment variables.

use super::types::LlmError;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    Anthropic,
    OpenAi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for LlmTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_LLM_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_LLM_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub provider: LlmProviderKind,
    pub api_key: String,
    pub model: String,
    pub openai_base_url: String,
    pub timeouts: LlmTimeouts,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("openai_base_url", &self.openai_base_url)
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl LlmConfig {
    /// Build typed LLM config from the process environment.
    ///
    /// # Errors
    ///
    /// See [`LlmConfig::from_lookup`].
    pub fn from_env() -> Result<Self, LlmError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build typed LLM config from a key lookup.
    ///
    /// Required:
    /// - `LLM_API_KEY_ENV` (names the variable containing the key)
    ///
    /// Optional:
    /// - `LLM_PROVIDER`: `anthropic` (default) or `openai`
    /// - `LLM_MODEL`: provider default when absent
    /// - `LLM_OPENAI_BASE_URL`: OpenAI-compatible API base URL
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error for an unknown provider or a missing API key.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, LlmError> {
        let provider = parse_provider(lookup("LLM_PROVIDER").as_deref())?;

        let key_var = lookup("LLM_API_KEY_ENV").ok_or_else(|| LlmError::MissingApiKey { var: "LLM_API_KEY_ENV".into() })?;
        let api_key = lookup(&key_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: key_var.clone() })?;

        let model = lookup("LLM_MODEL").unwrap_or_else(|| default_model(provider).to_string());
        let openai_base_url = lookup("LLM_OPENAI_BASE_URL")
            .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: parse_u64(&lookup, "LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_u64(&lookup, "LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS),
        };

        Ok(Self { provider, api_key, model, openai_base_url, timeouts })
    }
}

fn parse_u64(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> u64 {
    lookup(key)
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn parse_provider(raw: Option<&str>) -> Result<LlmProviderKind, LlmError> {
    match raw.unwrap_or("anthropic") {
        "anthropic" => Ok(LlmProviderKind::Anthropic),
        "openai" => Ok(LlmProviderKind::OpenAi),
        other => Err(LlmError::ConfigParse(format!("unknown LLM_PROVIDER: {other}"))),
    }
}

fn default_model(provider: LlmProviderKind) -> &'static str {
    match provider {
        LlmProviderKind::Anthropic => "claude-sonnet-4-5-20250929",
        LlmProviderKind::OpenAi => "gpt-4o",
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
