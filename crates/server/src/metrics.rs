//! Prometheus metrics for observability.
//!
//! Tracks HTTP request latency/counts and task lifecycle counters. Gauges
//! that mirror store contents are refreshed on scrape.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "glimpse_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("glimpse_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "glimpse_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Task Metrics
// =============================================================================

/// Tasks by current status (collected on scrape).
pub static TASKS_BY_STATUS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("glimpse_tasks_by_status", "Current task count by status"),
        &["status"],
    )
    .unwrap()
});

/// Tasks created total.
pub static TASKS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "glimpse_tasks_created_total",
        "Total tasks created since startup",
    )
    .unwrap()
});

/// Tasks failed total.
pub static TASKS_FAILED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "glimpse_tasks_failed_total",
        "Total tasks that reached the failed state",
    )
    .unwrap()
});

/// Analyses by processing method (graph, fallback, direct).
pub static ANALYSES_BY_METHOD: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "glimpse_analyses_total",
            "Completed analyses by processing method",
        ),
        &["method"],
    )
    .unwrap()
});

// =============================================================================
// Moderation Metrics
// =============================================================================

/// Moderation verdicts by kind and outcome.
pub static MODERATION_VERDICTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "glimpse_moderation_verdicts_total",
            "Moderation verdicts by content kind and outcome",
        ),
        &["kind", "outcome"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Tasks
    registry.register(Box::new(TASKS_BY_STATUS.clone())).unwrap();
    registry
        .register(Box::new(TASKS_CREATED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(TASKS_FAILED_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(ANALYSES_BY_METHOD.clone()))
        .unwrap();

    // Moderation
    registry
        .register(Box::new(MODERATION_VERDICTS_TOTAL.clone()))
        .unwrap();
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Refresh gauges that mirror current application state.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let mut counts = [0i64; 4];
    for record in state.tasks().list_all() {
        let idx = match record.status {
            glimpse_core::TaskStatus::Pending => 0,
            glimpse_core::TaskStatus::Processing => 1,
            glimpse_core::TaskStatus::Completed => 2,
            glimpse_core::TaskStatus::Failed => 3,
        };
        counts[idx] += 1;
    }
    for (status, count) in ["pending", "processing", "completed", "failed"]
        .iter()
        .zip(counts)
    {
        TASKS_BY_STATUS.with_label_values(&[status]).set(count);
    }
}

/// Normalize a path for metric labels (replace task ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    let task_id_regex = regex_lite::Regex::new(r"task_\d+_[0-9a-fA-F]+").unwrap();
    task_id_regex.replace_all(path, "{task_id}").to_string()
}
