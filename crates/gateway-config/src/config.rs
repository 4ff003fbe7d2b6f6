//! Gateway configuration model.

use gateway_core::{ProviderConfig, WireFamily};
use gateway_telemetry::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Logical id of the built-in default provider
pub const DEFAULT_MODEL: &str = "gemini-flash";

/// Root configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_default_model"))]
pub struct GatewayConfig {
    /// HTTP server settings
    #[validate(nested)]
    pub server: ServerConfig,

    /// Provider used when a request names no model
    #[validate(length(min = 1, max = 128))]
    pub default_model: String,

    /// Provider table; empty selects the built-in table
    #[validate(custom(function = "validate_providers"))]
    pub providers: Vec<ProviderConfig>,

    /// Retry policy for upstream calls
    #[validate(nested)]
    pub retry: RetrySettings,

    /// Streaming behaviour
    pub streaming: StreamingConfig,

    /// Request shaping
    #[validate(nested)]
    pub generation: GenerationConfig,

    /// Logging
    pub logging: LoggingConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            default_model: DEFAULT_MODEL.to_string(),
            providers: Vec::new(),
            retry: RetrySettings::default(),
            streaming: StreamingConfig::default(),
            generation: GenerationConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Configured providers, or the built-in table when none are configured
    #[must_use]
    pub fn effective_providers(&self) -> Vec<ProviderConfig> {
        if self.providers.is_empty() {
            builtin_providers()
        } else {
            self.providers.clone()
        }
    }
}

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    #[validate(length(min = 1))]
    pub host: String,

    /// Bind port
    #[validate(range(min = 1))]
    pub port: u16,

    /// Time allowed for in-flight requests after a shutdown signal
    #[serde(with = "humantime_serde")]
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            shutdown_grace: Duration::from_secs(10),
        }
    }
}

/// Retry settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
#[validate(schema(function = "validate_retry_bounds"))]
pub struct RetrySettings {
    /// Total attempts, including the first
    #[validate(range(min = 1, max = 10))]
    pub max_attempts: u32,

    /// Delay after the first failure
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,

    /// Cap on any single delay
    #[serde(with = "humantime_serde")]
    pub max_delay: Duration,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(4000),
        }
    }
}

/// Streaming settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Longest wait for the next upstream chunk; `0s` disables the limit
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl StreamingConfig {
    /// Idle limit, `None` when disabled
    #[must_use]
    pub fn idle_limit(&self) -> Option<Duration> {
        (!self.idle_timeout.is_zero()).then_some(self.idle_timeout)
    }
}

/// Request shaping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct GenerationConfig {
    /// System preamble for chat mode; empty disables it
    pub system_preamble: String,

    /// Temperature for tool-call mode
    #[validate(range(min = 0.0, max = 2.0))]
    pub tool_temperature: f64,

    /// Output token ceiling for tool-call mode
    #[validate(range(min = 1, max = 8192))]
    pub tool_max_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        let defaults = gateway_providers::GenerationSettings::default();
        Self {
            system_preamble: defaults.system_preamble,
            tool_temperature: defaults.tool_temperature,
            tool_max_tokens: defaults.tool_max_tokens,
        }
    }
}

impl From<&GenerationConfig> for gateway_providers::GenerationSettings {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            system_preamble: config.system_preamble.clone(),
            tool_temperature: config.tool_temperature,
            tool_max_tokens: config.tool_max_tokens,
        }
    }
}

/// The built-in provider table
#[must_use]
pub fn builtin_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(
            DEFAULT_MODEL,
            "https://generativelanguage.googleapis.com/v1beta",
            WireFamily::GenerateContent,
            "gemini-2.0-flash",
            "GEMINI_API_KEY",
        ),
        ProviderConfig::new(
            "gpt-4o-mini",
            "https://api.openai.com/v1/chat/completions",
            WireFamily::ChatCompletions,
            "gpt-4o-mini",
            "OPENAI_API_KEY",
        ),
        ProviderConfig::new(
            "deepseek-chat",
            "https://api.deepseek.com/chat/completions",
            WireFamily::ChatCompletions,
            "deepseek-chat",
            "DEEPSEEK_API_KEY",
        ),
        ProviderConfig::new(
            "llama-3.3-70b",
            "https://api.groq.com/openai/v1/chat/completions",
            WireFamily::ChatCompletions,
            "llama-3.3-70b-versatile",
            "GROQ_API_KEY",
        ),
    ]
}

fn validate_providers(providers: &[ProviderConfig]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for provider in providers {
        if provider.id.trim().is_empty()
            || provider.upstream_model.trim().is_empty()
            || provider.credential_key.trim().is_empty()
        {
            return Err(ValidationError::new("provider_field_empty")
                .with_message(format!("provider '{}' has an empty field", provider.id).into()));
        }
        if !(provider.url.starts_with("http://") || provider.url.starts_with("https://")) {
            return Err(ValidationError::new("provider_url")
                .with_message(format!("provider '{}' url must be http(s)", provider.id).into()));
        }
        if !seen.insert(provider.id.as_str()) {
            return Err(ValidationError::new("provider_duplicate")
                .with_message(format!("duplicate provider id '{}'", provider.id).into()));
        }
    }
    Ok(())
}

fn validate_default_model(config: &GatewayConfig) -> Result<(), ValidationError> {
    let known = if config.providers.is_empty() {
        builtin_providers().iter().any(|p| p.id == config.default_model)
    } else {
        config.providers.iter().any(|p| p.id == config.default_model)
    };
    if known {
        Ok(())
    } else {
        Err(ValidationError::new("default_model_unknown").with_message(
            format!("default model '{}' is not a configured provider", config.default_model).into(),
        ))
    }
}

fn validate_retry_bounds(retry: &RetrySettings) -> Result<(), ValidationError> {
    if retry.base_delay > retry.max_delay {
        return Err(ValidationError::new("retry_bounds")
            .with_message("base_delay must not exceed max_delay".into()));
    }
    Ok(())
}
