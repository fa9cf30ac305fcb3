//! Metrics and observability utilities
//!
//! Provides Prometheus metrics for research runs, their steps, and the
//! collaborators they call, with standardized naming conventions.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};

/// Metrics prefix for all DeepResearch metrics
pub const METRICS_PREFIX: &str = "deepresearch";

pub const RUNS_TOTAL: &str = "deepresearch_runs_total";
pub const RUN_DURATION: &str = "deepresearch_run_duration_seconds";
pub const STEPS_TOTAL: &str = "deepresearch_steps_total";
pub const STEP_DURATION: &str = "deepresearch_step_duration_seconds";
pub const FALLBACKS_TOTAL: &str = "deepresearch_fallbacks_total";
pub const GATEWAY_CALLS_TOTAL: &str = "deepresearch_gateway_calls_total";
pub const GATEWAY_DURATION: &str = "deepresearch_gateway_duration_seconds";

/// Buckets for search, fetch and prompting calls (in seconds)
pub const LATENCY_BUCKETS: &[f64] = &[
    0.010,  // 10ms
    0.050,  // 50ms
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.500,  // 2.5s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s
];

/// Buckets for whole runs; model-driven runs can take many minutes
pub const RUN_BUCKETS: &[f64] = &[
    1.0,     // 1s
    5.0,     // 5s
    15.0,    // 15s
    30.0,    // 30s
    60.0,    // 1m
    120.0,   // 2m
    300.0,   // 5m
    600.0,   // 10m
    1200.0,  // 20m - deep research budget
];

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        RUNS_TOTAL,
        Unit::Count,
        "Total research runs by mode and outcome"
    );

    describe_histogram!(
        RUN_DURATION,
        Unit::Seconds,
        "Research run latency in seconds"
    );

    describe_counter!(
        STEPS_TOTAL,
        Unit::Count,
        "Total pipeline steps recorded by step type"
    );

    describe_histogram!(
        STEP_DURATION,
        Unit::Seconds,
        "Pipeline step latency in seconds"
    );

    describe_counter!(
        FALLBACKS_TOTAL,
        Unit::Count,
        "Text service calls that fell back to a canned value"
    );

    describe_counter!(
        GATEWAY_CALLS_TOTAL,
        Unit::Count,
        "Search and fetch gateway calls"
    );

    describe_histogram!(
        GATEWAY_DURATION,
        Unit::Seconds,
        "Search and fetch gateway latency in seconds"
    );

    tracing::info!("Metrics registered");
}

/// Helper to record a finished research run
pub fn record_run(mode: &'static str, duration_secs: f64, success: bool) {
    let outcome = if success { "success" } else { "failure" };

    counter!(RUNS_TOTAL, "mode" => mode, "outcome" => outcome).increment(1);
    histogram!(RUN_DURATION, "mode" => mode).record(duration_secs);
}

/// Helper to record a trace step
pub fn record_step(step_type: &'static str, duration_secs: f64) {
    counter!(STEPS_TOTAL, "step_type" => step_type).increment(1);
    histogram!(STEP_DURATION, "step_type" => step_type).record(duration_secs);
}

/// Helper to record a text service fallback
pub fn record_fallback(operation: &'static str) {
    counter!(FALLBACKS_TOTAL, "operation" => operation).increment(1);
}

/// Helper to record a gateway call
pub fn record_gateway_call(source: &'static str, operation: &'static str, duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        GATEWAY_CALLS_TOTAL,
        "source" => source,
        "operation" => operation,
        "status" => status
    )
    .increment(1);

    histogram!(GATEWAY_DURATION, "source" => source, "operation" => operation)
        .record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_sorted(buckets: &[f64]) {
        let mut prev = 0.0;
        for &bucket in buckets {
            assert!(bucket > prev);
            prev = bucket;
        }
    }

    #[test]
    fn test_buckets_sorted() {
        assert_sorted(LATENCY_BUCKETS);
        assert_sorted(RUN_BUCKETS);

        // Deep research budget (20 minutes) is the last run bucket
        assert_eq!(RUN_BUCKETS.last(), Some(&1200.0));
    }

    #[test]
    fn test_metric_names_share_prefix() {
        for name in [RUNS_TOTAL, RUN_DURATION, STEPS_TOTAL, STEP_DURATION, FALLBACKS_TOTAL, GATEWAY_CALLS_TOTAL, GATEWAY_DURATION] {
            assert!(name.starts_with(METRICS_PREFIX));
        }
    }

    #[test]
    fn test_recording_without_recorder() {
        record_run("websearch-only", 1.5, true);
        record_step("search", 0.2);
        record_fallback("clarify");
        record_gateway_call("web", "search", 0.1, false);
        // Just verify it runs without panic
    }
}
