mod context;
mod metrics;

// Publicly expose the host-facing abstractions
pub use context::{LabelExtractor, RequestContext};

// Publicly expose metric descriptions and label sets
pub use metrics::{
    is_prometheus_label, // ---
    is_reserved_label,
    LabelSet,
    MetricSpec,
    BUCKET_LABEL,
    HTTP_REQUESTS_TOTAL,
    HTTP_REQUEST_DURATION_SECONDS,
    RESERVED_LABELS,
};
