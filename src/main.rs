//! # LLM Provider Gateway
//!
//! One HTTP endpoint in front of several LLM providers. Chat requests stream
//! back in a single canonical SSE dialect whatever the upstream speaks; tool
//! requests return one structured decision.
//!
//! ## Usage
//!
//! ```bash
//! # Start with the built-in provider table
//! llm-provider-gateway
//!
//! # Start with a configuration file (.yaml, .yml or .toml)
//! GATEWAY_CONFIG=/etc/gateway/config.yaml llm-provider-gateway
//!
//! # Start with environment overrides
//! GATEWAY_PORT=9000 GATEWAY_LOG_FORMAT=json llm-provider-gateway
//! ```

use gateway_config::{load_config, GatewayConfig, RetrySettings};
use gateway_providers::{EnvCredentials, GenerationSettings, ProviderRegistry};
use gateway_resilience::{RetryConfig, RetryPolicy};
use gateway_routing::{RequestRouter, RouterSettings};
use gateway_server::{AppState, Server};
use gateway_telemetry::{init_logging, GatewayMetrics};
use std::sync::Arc;
use tracing::{error, info};

/// Application entry point
#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting LLM Provider Gateway"
    );

    if let Err(e) = run(config).await {
        error!(error = %e, "Application failed");
        std::process::exit(1);
    }
}

/// Main application logic
async fn run(config: GatewayConfig) -> Result<(), Box<dyn std::error::Error>> {
    info!(
        host = %config.server.host,
        port = config.server.port,
        default_model = %config.default_model,
        "Configuration loaded"
    );

    let registry = ProviderRegistry::new(config.effective_providers(), &config.default_model)?;
    for provider in registry.providers() {
        info!(
            provider = %provider.id,
            wire_family = %provider.wire_family,
            upstream_model = %provider.upstream_model,
            "Provider registered"
        );
    }

    let settings = RouterSettings {
        generation: GenerationSettings::from(&config.generation),
        idle_timeout: config.streaming.idle_limit(),
    };
    let router = RequestRouter::new(
        Arc::new(registry),
        Arc::new(EnvCredentials),
        retry_policy(&config.retry),
        settings,
    )?;

    let state = AppState::new(router, GatewayMetrics::new()?);
    Server::new(config.server, state).run().await?;

    info!("Gateway stopped");
    Ok(())
}

fn retry_policy(settings: &RetrySettings) -> RetryPolicy {
    RetryPolicy::new(RetryConfig {
        max_attempts: settings.max_attempts,
        base_delay: settings.base_delay,
        max_delay: settings.max_delay,
    })
}
