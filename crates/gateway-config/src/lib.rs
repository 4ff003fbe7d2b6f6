//! # Gateway Config
//!
//! Configuration for the LLM Provider Gateway: the configuration model with
//! its validation rules, the built-in provider table, and loading from YAML
//! or TOML files with environment overrides.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod loader;

// Re-export main types
pub use config::{
    builtin_providers, GatewayConfig, GenerationConfig, RetrySettings, ServerConfig,
    StreamingConfig, DEFAULT_MODEL,
};
pub use error::ConfigError;
pub use loader::{load_config, load_file, parse, ConfigFormat, CONFIG_PATH_VAR};
