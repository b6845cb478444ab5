use super::MetricRegistry;
use crate::domain::{MetricSpec, HTTP_REQUESTS_TOTAL, HTTP_REQUEST_DURATION_SECONDS};
use crate::error::Result;
use prometheus::{HistogramVec, IntCounterVec};

/// Register the request counter (`http_requests_total`).
pub fn register_request_counter(
    registry: &MetricRegistry,
    label_names: &[String],
) -> Result<IntCounterVec> {
    // ---
    let spec = MetricSpec::new(
        HTTP_REQUESTS_TOTAL,
        "Total HTTP requests count",
        label_names.to_vec(),
    );
    registry.register_counter(&spec)
}

/// Register the request latency histogram (`http_request_duration_seconds`).
pub fn register_request_duration(
    registry: &MetricRegistry,
    label_names: &[String],
    buckets: &[f64],
) -> Result<HistogramVec> {
    // ---
    let spec = MetricSpec::new(
        HTTP_REQUEST_DURATION_SECONDS,
        "HTTP request duration in seconds",
        label_names.to_vec(),
    );
    registry.register_histogram(&spec, buckets)
}
