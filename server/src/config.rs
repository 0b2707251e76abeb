//! Server configuration.
//!
//! DESIGN
//! ======
//! Everything is read through a lookup function so tests never touch the
//! process environment. `from_env()` wraps `std::env::var` and is called
//! once in `main` after `dotenvy` has loaded `.env`.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ErrorCode;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_AI_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_CREATOR_FORM_URL: &str =
    "https://docs.google.com/forms/d/e/1FAIpQLSxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx/viewform?embedded=true";
pub const DEFAULT_BUYER_FORM_URL: &str =
    "https://docs.google.com/forms/d/e/1FAIpQLSyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyyy/viewform?embedded=true";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

impl ErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        "E_CONFIG"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: IpAddr,
    pub port: u16,
    /// Static site served as the router fallback.
    pub website_dir: Option<PathBuf>,
    pub creator_form_url: String,
    pub buyer_form_url: String,
    /// `max_tokens` for every generator call.
    pub ai_max_tokens: u32,
    /// Peers whose `X-Forwarded-For` header is honoured for client keys.
    pub trusted_proxies: Vec<IpAddr>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            website_dir: None,
            creator_form_url: DEFAULT_CREATOR_FORM_URL.to_string(),
            buyer_form_url: DEFAULT_BUYER_FORM_URL.to_string(),
            ai_max_tokens: DEFAULT_AI_MAX_TOKENS,
            trusted_proxies: Vec::new(),
        }
    }
}

impl ServerConfig {
    /// # Errors
    ///
    /// See [`ServerConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a set variable does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let ai_max_tokens = parse_strict(&lookup, "AI_MAX_TOKENS", defaults.ai_max_tokens)?;
        if ai_max_tokens == 0 {
            return Err(ConfigError::Invalid { key: "AI_MAX_TOKENS", value: "0".into() });
        }
        Ok(Self {
            bind_addr: parse_strict(&lookup, "BIND_ADDR", defaults.bind_addr)?,
            port: parse_strict(&lookup, "PORT", defaults.port)?,
            website_dir: non_blank(&lookup, "WEBSITE_DIR").map(PathBuf::from),
            creator_form_url: non_blank(&lookup, "SURVEY_CREATOR_FORM_URL").unwrap_or(defaults.creator_form_url),
            buyer_form_url: non_blank(&lookup, "SURVEY_BUYER_FORM_URL").unwrap_or(defaults.buyer_form_url),
            ai_max_tokens,
            trusted_proxies: parse_list(&lookup, "TRUSTED_PROXIES")?,
        })
    }

    #[must_use]
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// Trimmed value of `key`, or `None` when unset or blank.
pub(crate) fn non_blank(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Parse `key`, falling back to `default` when unset or unparseable.
pub(crate) fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    non_blank(lookup, key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn parse_strict<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match non_blank(lookup, key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}

/// Comma-separated list; empty entries are skipped.
fn parse_list<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<Vec<T>, ConfigError> {
    let Some(raw) = non_blank(lookup, key) else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| v.parse().map_err(|_| ConfigError::Invalid { key, value: v.to_string() }))
        .collect()
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
