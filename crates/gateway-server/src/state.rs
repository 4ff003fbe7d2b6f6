//! Shared handler state.

use gateway_routing::RequestRouter;
use gateway_telemetry::GatewayMetrics;
use std::sync::Arc;

/// State handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Upstream dispatcher
    pub router: Arc<RequestRouter>,
    /// Prometheus metrics
    pub metrics: GatewayMetrics,
}

impl AppState {
    /// Create application state
    #[must_use]
    pub fn new(router: RequestRouter, metrics: GatewayMetrics) -> Self {
        Self {
            router: Arc::new(router),
            metrics,
        }
    }
}
