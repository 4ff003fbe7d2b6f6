//! Prometheus metrics.
//!
//! Metrics live in their own [`Registry`] so several gateways (for example in
//! tests) can coexist in one process.

use crate::error::TelemetryError;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::fmt;
use std::time::Duration;

const DURATION_BUCKETS: [f64; 10] = [0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0];

/// Request metrics for the gateway
#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    requests: IntCounterVec,
    errors: IntCounterVec,
    duration: HistogramVec,
}

impl fmt::Debug for GatewayMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayMetrics").finish_non_exhaustive()
    }
}

impl GatewayMetrics {
    /// Create and register all gateway metrics
    ///
    /// # Errors
    /// Returns error if a metric cannot be created or registered
    pub fn new() -> Result<Self, TelemetryError> {
        let registry = Registry::new();

        let requests = IntCounterVec::new(
            Opts::new("gateway_requests_total", "Requests handled, by mode, provider and outcome"),
            &["mode", "provider", "outcome"],
        )?;
        let errors = IntCounterVec::new(
            Opts::new("gateway_request_errors_total", "Failed requests by error type"),
            &["error_type"],
        )?;
        let duration = HistogramVec::new(
            HistogramOpts::new(
                "gateway_request_duration_seconds",
                "Time until the response started, by mode",
            )
            .buckets(DURATION_BUCKETS.to_vec()),
            &["mode"],
        )?;

        registry.register(Box::new(requests.clone()))?;
        registry.register(Box::new(errors.clone()))?;
        registry.register(Box::new(duration.clone()))?;

        Ok(Self {
            registry,
            requests,
            errors,
            duration,
        })
    }

    /// Record a finished request
    pub fn record_request(&self, mode: &str, provider: &str, outcome: &str, elapsed: Duration) {
        self.requests
            .with_label_values(&[mode, provider, outcome])
            .inc();
        self.duration
            .with_label_values(&[mode])
            .observe(elapsed.as_secs_f64());
    }

    /// Record a failed request by error type
    pub fn record_error(&self, error_type: &str) {
        self.errors.with_label_values(&[error_type]).inc();
    }

    /// Render all metrics in the text exposition format
    ///
    /// # Errors
    /// Returns error if encoding fails
    pub fn render(&self) -> Result<String, TelemetryError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_recorded_series() {
        let metrics = GatewayMetrics::new().expect("metrics");
        metrics.record_request("chat", "gemini-flash", "success", Duration::from_millis(120));
        metrics.record_error("upstream_exhausted");

        let text = metrics.render().expect("render");
        assert!(text.contains(
            r#"gateway_requests_total{mode="chat",outcome="success",provider="gemini-flash"} 1"#
        ));
        assert!(text.contains(r#"gateway_request_errors_total{error_type="upstream_exhausted"} 1"#));
        assert!(text.contains("gateway_request_duration_seconds_bucket"));
    }

    #[test]
    fn test_independent_registries() {
        let first = GatewayMetrics::new().expect("first");
        let second = GatewayMetrics::new().expect("second");
        first.record_error("validation_error");
        assert!(!second.render().expect("render").contains("validation_error"));
    }
}
