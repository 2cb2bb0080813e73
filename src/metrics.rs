// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for es-console.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The embedding shell is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `es_console_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms
//!
//! # Labels
//! - `operation`: search, sample, list_indices, …
//! - `status`: success, error

use metrics::{counter, histogram};
use std::time::Duration;

/// Record a remote call against the cluster.
pub fn record_remote_call(operation: &str, status: &str) {
    counter!(
        "es_console_remote_calls_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record remote call latency.
pub fn record_latency(operation: &str, duration: Duration) {
    histogram!(
        "es_console_remote_call_seconds",
        "operation" => operation.to_string()
    )
    .record(duration.as_secs_f64());
}

/// Record the hit count of a search response.
pub fn record_search_results(count: usize) {
    histogram!("es_console_search_results").record(count as f64);
}

/// Record how many fields a sample document yielded.
pub fn record_fields_inferred(count: usize) {
    histogram!("es_console_fields_inferred").record(count as f64);
}

/// Record a response discarded because a newer request superseded it.
pub fn record_stale_response(operation: &str) {
    counter!(
        "es_console_stale_responses_total",
        "operation" => operation.to_string()
    )
    .increment(1);
}

/// Record a connection lifecycle event.
pub fn record_connection(operation: &str, status: &str) {
    counter!(
        "es_console_connections_total",
        "operation" => operation.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}
