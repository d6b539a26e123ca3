// SPDX-FileCopyrightText: 2025 Semiotic Labs
//
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics module
//!
//! Provides global metrics using the default Prometheus registry via macros
//! and an Axum-compatible metrics handler.

use std::sync::LazyLock;

use axum::{
    http::{StatusCode, header},
    response::Response,
};
use prometheus::{Encoder, IntCounterVec, TextEncoder, register_int_counter_vec};
use relay_types::CallOutcome;

/// Total number of relay requests received, labeled by operation.
pub static RELAY_REQUESTS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "meli_relay_requests_total",
        "Total number of relay requests, labeled by operation",
        &["operation"]
    )
    .expect("Failed to create meli_relay_requests_total counter vec")
});

/// Total number of upstream calls issued, labeled by endpoint and result.
pub static UPSTREAM_CALLS: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        "meli_relay_upstream_calls_total",
        "Total number of upstream Mercado Livre calls, labeled by endpoint and result",
        &["endpoint", "result"]
    )
    .expect("Failed to create meli_relay_upstream_calls_total counter vec")
});

/// Increment the relay request counter for one operation.
pub fn inc_relay_request(operation: &str) {
    RELAY_REQUESTS.with_label_values(&[operation]).inc();
}

/// Record one upstream call result.
pub fn inc_upstream_call(endpoint: &str, result: &str) {
    UPSTREAM_CALLS.with_label_values(&[endpoint, result]).inc();
}

/// Record an upstream call result from its tagged outcome.
pub fn record_outcome(endpoint: &str, outcome: &CallOutcome) {
    let result = if outcome.is_success() {
        "success"
    } else {
        "failure"
    };
    inc_upstream_call(endpoint, result);
}

/// Axum handler that exports metrics in Prometheus text format
///
/// # Panics
///
/// This function will panic if:
/// - The metrics encoder fails to encode the metrics data
/// - The UTF-8 conversion of the encoded buffer fails
/// - The HTTP response builder fails to create the response
pub async fn metrics_handler() -> Response<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .expect("Failed to encode metrics");

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, encoder.format_type())
        .body(String::from_utf8(buffer).expect("metrics buffer should be valid UTF-8"))
        .expect("Failed to create metrics response")
}
