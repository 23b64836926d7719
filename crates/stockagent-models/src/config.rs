use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for the stock agent service.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub market_data: MarketDataConfig,
    #[serde(default)]
    pub recommendation: RecommendationConfig,
}

/// Where the HTTP server listens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration for the market-data (price) provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketDataConfig {
    /// Base URL of the chart endpoint. The ticker is appended as a path segment.
    #[serde(default = "default_chart_url")]
    pub chart_url: String,
    /// History window requested per lookup.
    #[serde(default = "default_range")]
    pub range: String,
    /// Bar interval requested per lookup.
    #[serde(default = "default_interval")]
    pub interval: String,
    /// Per-request timeout. None = wait for the provider indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            chart_url: default_chart_url(),
            range: default_range(),
            interval: default_interval(),
            timeout_seconds: None,
        }
    }
}

/// Configuration for the chat-completion (recommendation) provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the bearer credential.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Fail instead of falling back when the response lacks `choices[0].message.content`.
    #[serde(default)]
    pub strict_response: bool,
    /// Per-request timeout. None = wait for the provider indefinitely.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            strict_response: false,
            timeout_seconds: None,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_chart_url() -> String {
    "https://query1.finance.yahoo.com/v8/finance/chart".to_string()
}
fn default_range() -> String {
    "1d".to_string()
}
fn default_interval() -> String {
    "1d".to_string()
}
fn default_endpoint() -> String {
    "https://openrouter.ai/api/v1/chat/completions".to_string()
}
fn default_model() -> String {
    "deepseek/deepseek-chat-v3-0324:free".to_string()
}
fn default_api_key_env() -> String {
    "OPENROUTER_API_KEY".to_string()
}

/// Bearer credential for the recommendation provider, resolved once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ConfigError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(ConfigError::Invalid("API key is blank".to_string()));
        }
        Ok(Self { api_key })
    }

    /// Resolve the credential through an arbitrary lookup (environment, test map, ...).
    pub fn from_lookup<F>(var: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        match lookup(var) {
            Some(value) if !value.trim().is_empty() => Ok(Self { api_key: value }),
            _ => Err(ConfigError::MissingCredential(var.to_string())),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
