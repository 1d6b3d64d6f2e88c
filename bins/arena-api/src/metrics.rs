// Prometheus metrics for the judge API

use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};

lazy_static! {
    pub static ref ASSEMBLIES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "arena_assemblies_total",
        "Programs assembled, by language",
        &["language"]
    )
    .expect("arena_assemblies_total registers once");

    pub static ref ASSEMBLE_ERRORS_TOTAL: IntCounter = register_int_counter!(
        "arena_assemble_errors_total",
        "Assembly requests rejected"
    )
    .expect("arena_assemble_errors_total registers once");

    pub static ref VERDICTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "arena_verdicts_total",
        "Comparison verdicts, by overall status",
        &["status"]
    )
    .expect("arena_verdicts_total registers once");

    pub static ref OBSERVED_TIME_MS: Histogram = register_histogram!(
        "arena_observed_time_ms",
        "Observed per-test-case execution time in milliseconds",
        vec![1.0, 5.0, 10.0, 50.0, 100.0, 250.0, 500.0, 1000.0, 2500.0, 5000.0]
    )
    .expect("arena_observed_time_ms registers once");
}

/// Render every registered metric in the Prometheus text format
pub fn render() -> Result<String, String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| format!("Failed to encode metrics: {}", e))?;
    String::from_utf8(buffer).map_err(|e| format!("Metrics are not UTF-8: {}", e))
}
