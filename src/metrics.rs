// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics collection for Recipe Relay.
//!
//! Tracks upstream call volume, outcomes, and latency.

use prometheus::{Histogram, HistogramOpts, IntCounter, Opts, Registry};
use std::sync::Arc;

use crate::error::AppError;

/// Metrics collector for the relay
#[derive(Clone)]
pub struct Metrics {
    pub registry: Arc<Registry>,

    pub upstream_requests: IntCounter,
    pub upstream_failures: IntCounter,
    pub upstream_not_found: IntCounter,
    pub upstream_latency: Histogram,
}

impl Metrics {
    pub fn new() -> Result<Self, AppError> {
        let registry = Registry::new();

        let upstream_requests = IntCounter::with_opts(Opts::new(
            "recipe_relay_upstream_requests_total",
            "Total number of calls made to the upstream recipe provider",
        ))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        let upstream_failures = IntCounter::with_opts(Opts::new(
            "recipe_relay_upstream_failures_total",
            "Total number of upstream calls that failed in transport or parsing",
        ))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        let upstream_not_found = IntCounter::with_opts(Opts::new(
            "recipe_relay_upstream_not_found_total",
            "Total number of recipe lookups the upstream answered with 404",
        ))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        let upstream_latency = Histogram::with_opts(
            HistogramOpts::new(
                "recipe_relay_upstream_latency_seconds",
                "Duration of upstream recipe requests in seconds",
            )
            .buckets(vec![
                0.005, 0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.0, 5.0, 10.0,
            ]),
        )
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create metric: {}", e)))?;

        registry
            .register(Box::new(upstream_requests.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;
        registry
            .register(Box::new(upstream_failures.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;
        registry
            .register(Box::new(upstream_not_found.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;
        registry
            .register(Box::new(upstream_latency.clone()))
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to register metric: {}", e)))?;

        Ok(Self {
            registry: Arc::new(registry),
            upstream_requests,
            upstream_failures,
            upstream_not_found,
            upstream_latency,
        })
    }

    /// Record an upstream call attempt
    pub fn record_upstream_request(&self) {
        self.upstream_requests.inc();
    }

    /// Record an upstream transport or parse failure
    pub fn record_upstream_failure(&self) {
        self.upstream_failures.inc();
    }

    pub fn record_upstream_not_found(&self) {
        self.upstream_not_found.inc();
    }

    /// Observe latency for an upstream call in seconds
    pub fn record_upstream_latency(&self, seconds: f64) {
        self.upstream_latency.observe(seconds);
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String, AppError> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to encode metrics: {}", e)))?;

        String::from_utf8(buffer).map_err(|e| {
            AppError::Internal(anyhow::anyhow!(
                "Failed to convert metrics to string: {}",
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_includes_recorded_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_upstream_request();
        metrics.record_upstream_request();
        metrics.record_upstream_failure();
        metrics.record_upstream_latency(0.02);

        let text = metrics.export().unwrap();
        assert!(text.contains("recipe_relay_upstream_requests_total 2"));
        assert!(text.contains("recipe_relay_upstream_failures_total 1"));
        assert!(text.contains("recipe_relay_upstream_latency_seconds_count 1"));
    }
}
