//! Configuration loading.
//!
//! Order of precedence, lowest first: built-in defaults, the file named by
//! `GATEWAY_CONFIG`, then individual `GATEWAY_*` environment overrides.

use crate::config::GatewayConfig;
use crate::error::ConfigError;
use gateway_telemetry::LogFormat;
use std::path::Path;
use tracing::{debug, info};
use validator::Validate;

/// Environment variable naming the configuration file
pub const CONFIG_PATH_VAR: &str = "GATEWAY_CONFIG";

/// Supported file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML document
    Yaml,
    /// TOML document
    Toml,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    ///
    /// # Errors
    /// Returns `UnsupportedFormat` for any other extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or_default().to_string(),
            )),
        }
    }
}

/// Load configuration from the process environment
///
/// # Errors
/// Returns error if the file cannot be read or parsed, an override is
/// malformed, or the result fails validation
pub fn load_config() -> Result<GatewayConfig, ConfigError> {
    let lookup = |key: &str| std::env::var(key).ok();
    let config = match lookup(CONFIG_PATH_VAR).filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            info!(path = %path, "Loading configuration file");
            load_file(Path::new(&path))?
        }
        None => {
            debug!("No configuration file set, using defaults");
            GatewayConfig::default()
        }
    };
    finish(config, lookup)
}

/// Read and parse a configuration file without overrides or validation
///
/// # Errors
/// Returns error if the file cannot be read or parsed
pub fn load_file(path: &Path) -> Result<GatewayConfig, ConfigError> {
    let format = ConfigFormat::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&content, format)
}

/// Parse configuration text
///
/// # Errors
/// Returns `Parse` if the text is not a valid document of that format
pub fn parse(content: &str, format: ConfigFormat) -> Result<GatewayConfig, ConfigError> {
    match format {
        ConfigFormat::Yaml => {
            serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
        }
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string())),
    }
}

/// Apply environment overrides, then validate
///
/// # Errors
/// Returns error if an override is malformed or validation fails
pub fn finish<F>(mut config: GatewayConfig, lookup: F) -> Result<GatewayConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    apply_env_overrides(&mut config, lookup)?;
    config.validate()?;
    Ok(config)
}

/// Apply `GATEWAY_*` overrides from `lookup`
///
/// # Errors
/// Returns `InvalidOverride` if a value cannot be parsed
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    if let Some(host) = get("GATEWAY_HOST") {
        config.server.host = host;
    }
    if let Some(port) = get("GATEWAY_PORT") {
        config.server.port = port.trim().parse().map_err(|e| ConfigError::InvalidOverride {
            var: "GATEWAY_PORT".to_string(),
            message: format!("{e}"),
        })?;
    }
    if let Some(model) = get("GATEWAY_DEFAULT_MODEL") {
        config.default_model = model.trim().to_string();
    }
    if let Some(level) = get("GATEWAY_LOG_LEVEL") {
        config.logging.level = level;
    }
    if let Some(format) = get("GATEWAY_LOG_FORMAT") {
        config.logging.format =
            format
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::InvalidOverride {
                    var: "GATEWAY_LOG_FORMAT".to_string(),
                    message: e.to_string(),
                })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use gateway_core::WireFamily;
    use std::collections::HashMap;
    use std::io::Write;
    use std::time::Duration;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    const YAML: &str = r#"
server:
  port: 9090
  shutdown_grace: 5s
default_model: local-llama
providers:
  - id: local-llama
    url: http://localhost:11434/v1/chat/completions
    wire_family: chat-completions
    upstream_model: llama3.2
    credential_key: LOCAL_LLAMA_KEY
  - id: gemini-pro
    url: https://generativelanguage.googleapis.com/v1beta
    wire_family: generate-content
    upstream_model: gemini-1.5-pro
    credential_key: GEMINI_API_KEY
retry:
  max_attempts: 2
  base_delay: 250ms
  max_delay: 1s
streaming:
  idle_timeout: 0s
logging:
  format: json
"#;

    #[test]
    fn test_parse_yaml() {
        let config = parse(YAML, ConfigFormat::Yaml).expect("yaml");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.shutdown_grace, Duration::from_secs(5));
        assert_eq!(config.providers[1].wire_family, WireFamily::GenerateContent);
        assert_eq!(config.retry.base_delay, Duration::from_millis(250));
        assert_eq!(config.streaming.idle_limit(), None);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.generation.tool_max_tokens, 256);
        assert!(finish(config, env(&[])).is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
default_model = "gpt-4o-mini"

[server]
host = "127.0.0.1"

[generation]
system_preamble = ""
tool_temperature = 0.0
"#;
        let config = parse(toml, ConfigFormat::Toml).expect("toml");
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.providers.is_empty());
        assert_eq!(config.generation.system_preamble, "");
        assert!(finish(config, env(&[])).is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = finish(
            GatewayConfig::default(),
            env(&[
                ("GATEWAY_PORT", "3000"),
                ("GATEWAY_DEFAULT_MODEL", "deepseek-chat"),
                ("GATEWAY_LOG_FORMAT", "json"),
                ("GATEWAY_HOST", ""),
            ]),
        )
        .expect("valid");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.default_model, "deepseek-chat");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_port_override() {
        let err = finish(GatewayConfig::default(), env(&[("GATEWAY_PORT", "http")]))
            .expect_err("bad port");
        assert!(matches!(err, ConfigError::InvalidOverride { ref var, .. } if var == "GATEWAY_PORT"));
    }

    #[test]
    fn test_unknown_default_override_fails_validation() {
        let err = finish(
            GatewayConfig::default(),
            env(&[("GATEWAY_DEFAULT_MODEL", "nope")]),
        )
        .expect_err("unknown default");
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_load_file_by_extension() {
        let dir = std::env::temp_dir().join(format!("gateway-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("temp dir");
        let path = dir.join("gateway.yaml");
        std::fs::File::create(&path)
            .and_then(|mut f| f.write_all(YAML.as_bytes()))
            .expect("write");

        let config = load_file(&path).expect("load");
        assert_eq!(config.default_model, "local-llama");

        assert!(matches!(
            load_file(&dir.join("gateway.json")),
            Err(ConfigError::UnsupportedFormat(_))
        ));
        assert!(matches!(
            load_file(&dir.join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
