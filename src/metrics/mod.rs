//! Prometheus metrics for monitoring
//!
//! Exposes metrics for:
//! - Wallet session transitions
//! - Balance fetches
//! - Swap attempts and outcomes
//! - Host frame notifications
//! - RPC failovers

use crate::error::SwapError;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use prometheus::{register_counter_vec, CounterVec, Encoder, TextEncoder};

lazy_static! {
    // Session metrics
    pub static ref SESSION_TRANSITIONS: CounterVec = register_counter_vec!(
        "cheese_swap_session_transitions_total",
        "Wallet session transitions by kind",
        &["kind"]
    ).unwrap();

    // Balance metrics
    pub static ref BALANCE_FETCHES: CounterVec = register_counter_vec!(
        "cheese_swap_balance_fetches_total",
        "Balance fetches by result (ok, error, stale)",
        &["result"]
    ).unwrap();

    // Swap metrics
    pub static ref SWAP_ATTEMPTS: CounterVec = register_counter_vec!(
        "cheese_swap_attempts_total",
        "Swap attempts by outcome",
        &["outcome"]
    ).unwrap();

    // Host metrics
    pub static ref HOST_EVENTS: CounterVec = register_counter_vec!(
        "cheese_swap_host_events_total",
        "Events posted to the hosting frame by type",
        &["event_type"]
    ).unwrap();

    // RPC metrics
    pub static ref RPC_FAILOVERS: CounterVec = register_counter_vec!(
        "cheese_swap_rpc_failovers_total",
        "RPC endpoint failovers by method",
        &["method"]
    ).unwrap();
}

/// Render all registered metrics in the Prometheus text format
pub fn gather_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not valid UTF-8")
}

// Helper functions to record metrics

pub fn record_session_transition(connected: bool) {
    SESSION_TRANSITIONS
        .with_label_values(&[if connected { "connected" } else { "disconnected" }])
        .inc();
}

pub fn record_balance_fetch(result: &str) {
    BALANCE_FETCHES.with_label_values(&[result]).inc();
}

pub fn record_swap_success() {
    SWAP_ATTEMPTS.with_label_values(&["success"]).inc();
}

pub fn record_swap_failure(error: &SwapError) {
    SWAP_ATTEMPTS.with_label_values(&[error.kind()]).inc();
}

pub fn record_host_event(event_type: &str) {
    HOST_EVENTS.with_label_values(&[event_type]).inc();
}

pub fn record_rpc_failover(method: &str) {
    RPC_FAILOVERS.with_label_values(&[method]).inc();
}
