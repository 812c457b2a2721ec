// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics instrumentation for search-bridge.
//!
//! Uses the `metrics` crate for backend-agnostic metrics collection.
//! The host application is responsible for choosing the exporter
//! (Prometheus, OTEL, etc.)
//!
//! # Metric Naming Convention
//! - `search_bridge_` prefix for all metrics
//! - `_total` suffix for counters
//! - `_seconds` suffix for duration histograms

use metrics::{counter, gauge, histogram};
use std::time::Instant;

/// Record a completed filter-tree translation
pub fn record_translation(status: &str) {
    counter!(
        "search_bridge_translations_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Record a string rank encoding
pub fn record_rank_encoding(transliterated: bool) {
    let source = if transliterated { "transliterated" } else { "raw" };
    counter!(
        "search_bridge_rank_encodings_total",
        "source" => source
    )
    .increment(1);
}

/// Record an indexing gate toggle
pub fn record_gate_toggle(enabled: bool) {
    let state = if enabled { "enabled" } else { "disabled" };
    counter!(
        "search_bridge_gate_toggles_total",
        "state" => state
    )
    .increment(1);
}

/// Record an executed in-memory query and its result count
pub fn record_memory_query(results: usize) {
    counter!("search_bridge_memory_queries_total").increment(1);
    histogram!("search_bridge_memory_query_results").record(results as f64);
}

/// Set the number of registered search indexes
pub fn set_registered_indexes(count: usize) {
    gauge!("search_bridge_registered_indexes").set(count as f64);
}

/// A timing guard that records latency on drop
pub struct LatencyTimer {
    component: &'static str,
    operation: &'static str,
    start: Instant,
}

impl LatencyTimer {
    /// Start a new latency timer
    pub fn new(component: &'static str, operation: &'static str) -> Self {
        Self {
            component,
            operation,
            start: Instant::now(),
        }
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(
            "search_bridge_operation_seconds",
            "component" => self.component,
            "operation" => self.operation
        )
        .record(self.start.elapsed().as_secs_f64());
    }
}
