//! HTTP request handlers for the gateway API.

use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::stream::StreamExt;
use gateway_core::{GatewayError, GatewayRequest, ToolCallResult, ToolDeclaration};
use gateway_providers::{native_tool_catalog, tool_catalog};
use gateway_routing::{ChatOutcome, RouteOutcome, ToolOutcome};
use serde::Serialize;
use std::{convert::Infallible, time::Instant};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    error::ApiError,
    extractors::{JsonBody, RequestId},
    state::AppState,
};

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Version
    pub version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Metrics endpoint (Prometheus format)
pub async fn metrics_endpoint(State(state): State<AppState>) -> Result<Response, ApiError> {
    let body = state
        .metrics
        .render()
        .map_err(|e| ApiError::internal(format!("Failed to render metrics: {e}")))?;

    Ok(([(header::CONTENT_TYPE, "text/plain; version=0.0.4")], body).into_response())
}

/// One registry entry
#[derive(Debug, Serialize)]
pub struct ModelEntry {
    /// Logical model identifier
    pub id: String,
    /// Wire family spoken by the upstream
    pub wire_family: String,
    /// Model name sent upstream
    pub upstream_model: String,
    /// Whether requests without a model land here
    pub default: bool,
}

/// `GET /v1/models` response
#[derive(Debug, Serialize)]
pub struct ModelsResponse {
    /// Always `list`
    pub object: &'static str,
    /// Registered providers
    pub data: Vec<ModelEntry>,
}

/// List the provider registry
pub async fn list_models(State(state): State<AppState>) -> Json<ModelsResponse> {
    let registry = state.router.registry();
    let default_id = registry.default_id();

    let data = registry
        .providers()
        .map(|provider| ModelEntry {
            id: provider.id.clone(),
            wire_family: provider.wire_family.to_string(),
            upstream_model: provider.upstream_model.clone(),
            default: provider.id == default_id,
        })
        .collect();

    Json(ModelsResponse {
        object: "list",
        data,
    })
}

/// Canonical tool catalog
pub async fn list_tools() -> Json<&'static [ToolDeclaration]> {
    Json(tool_catalog())
}

/// Tool catalog in the generate-content wrapper
pub async fn list_native_tools() -> impl IntoResponse {
    Json(native_tool_catalog())
}

/// Provider label for requests whose model matched no registered provider
pub const UNRESOLVED_PROVIDER: &str = "unresolved";

/// Gateway envelope endpoint
///
/// Chat mode answers with a canonical SSE body, tool-call mode with the raw
/// upstream decision.
#[instrument(
    skip_all,
    fields(
        request_id = %request_id,
        mode = request.request_mode().as_str(),
        model = request.requested_model(),
    )
)]
pub async fn chat_completions(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    JsonBody(request): JsonBody<GatewayRequest>,
) -> Result<Response, ApiError> {
    let mode = request.request_mode();
    debug!(messages = request.messages.len(), "Processing gateway request");

    let start = Instant::now();
    match state.router.route(&request).await {
        Ok(RouteOutcome::Chat(outcome)) => {
            state
                .metrics
                .record_request(mode.as_str(), &outcome.provider.id, "ok", start.elapsed());
            Ok(stream_response(outcome))
        }
        Ok(RouteOutcome::Tool(outcome)) => {
            state
                .metrics
                .record_request(mode.as_str(), &outcome.provider.id, "ok", start.elapsed());
            log_decision(&outcome);
            Ok(Json(outcome.decision).into_response())
        }
        Err(e) => {
            let provider = state
                .router
                .registry()
                .resolve(request.requested_model())
                .map_or_else(|_| UNRESOLVED_PROVIDER.to_string(), |p| p.id.clone());
            state
                .metrics
                .record_request(mode.as_str(), &provider, "error", start.elapsed());
            state.metrics.record_error(e.error_type());
            log_failure(&e);
            Err(e.into())
        }
    }
}

fn stream_response(outcome: ChatOutcome) -> Response {
    info!(provider = %outcome.provider.id, "Streaming canonical response");
    let body = Body::from_stream(outcome.stream.map(Ok::<_, Infallible>));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        body,
    )
        .into_response()
}

fn log_decision(outcome: &ToolOutcome) {
    let provider = outcome.provider.id.as_str();
    match outcome.interpretation() {
        Some(ToolCallResult::Invocation { name, arguments }) => {
            info!(provider, tool = %name, arguments = %arguments, "Model selected a tool");
        }
        Some(ToolCallResult::Text { text }) => {
            info!(provider, chars = text.chars().count(), "Model answered with text");
        }
        None => warn!(provider, "Unrecognised tool decision shape"),
    }
}

fn log_failure(err: &GatewayError) {
    let error_type = err.error_type();
    if err.status_code() >= 500 {
        error!(error_type, error = %err, "Gateway request failed");
    } else {
        warn!(error_type, error = %err, "Gateway request rejected");
    }
}
