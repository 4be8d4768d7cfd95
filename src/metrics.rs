// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for the SphinxQL adapter.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host process is responsible for choosing the exporter (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `sphinx_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `kind`: select, statement, affecting
//! - `status`: success, error
//! - `feature`: the rejected capability (see [`crate::Unsupported::name`])

use metrics::{counter, histogram};
use std::time::{Duration, Instant};

/// Record a statement round trip outcome
pub fn record_statement(kind: &str, status: &str) {
    counter!(
        "sphinx_statements_total",
        "kind" => kind.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record statement latency
pub fn record_latency(kind: &str, duration: Duration) {
    histogram!(
        "sphinx_statement_seconds",
        "kind" => kind.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record a schema call refused by the capability gate
pub fn record_capability_rejection(feature: &str) {
    counter!(
        "sphinx_capability_rejections_total",
        "feature" => feature.to_string()
    )
    .increment(1);
}

/// Record a query answered locally because its predicates can never match
pub fn record_short_circuit() {
    counter!("sphinx_short_circuit_queries_total").increment(1);
}

/// RAII timer that records statement latency on drop
pub struct LatencyTimer {
    kind: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        record_latency(self.kind, self.start.elapsed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Without an installed recorder these are no-ops; they verify the API doesn't panic.

    #[test]
    fn test_record_statement() {
        record_statement("select", "success");
        record_statement("statement", "error");
    }

    #[test]
    fn test_record_capability_rejection() {
        record_capability_rejection("create_table");
        record_short_circuit();
    }

    #[test]
    fn test_latency_timer_drop() {
        let timer = LatencyTimer::new("select");
        std::thread::sleep(Duration::from_millis(1));
        drop(timer);
    }
}
