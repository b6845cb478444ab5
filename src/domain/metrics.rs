//! Metric descriptions and label sets shared by the registry and the
//! instrumentation engine.

/// Name of the request counter.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";

/// Name of the request duration histogram.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";

/// Label names owned by the instrumentation core. User configuration may
/// not redefine them.
pub const RESERVED_LABELS: [&str; 3] = ["method", "path", "status"];

/// Returns `true` if `name` is one of [`RESERVED_LABELS`].
pub fn is_reserved_label(name: &str) -> bool {
    RESERVED_LABELS.contains(&name)
}

/// Bucket bound label added to every histogram sample.
pub const BUCKET_LABEL: &str = "le";

/// Returns `true` if Prometheus itself owns `name`: the histogram bucket
/// label, or anything in the `__` namespace.
pub fn is_prometheus_label(name: &str) -> bool {
    name == BUCKET_LABEL || name.starts_with("__")
}

/// Description of a metric instrument.
///
/// `label_names` is ordered; label values are always supplied positionally
/// in this order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub name: String,
    pub help: String,
    pub label_names: Vec<String>,
}

impl MetricSpec {
    // ---

    pub fn new(name: impl Into<String>, help: impl Into<String>, label_names: Vec<String>) -> Self {
        // ---
        Self {
            name: name.into(),
            help: help.into(),
            label_names,
        }
    }
}

/// Ordered label name/value pairs for a single observation.
///
/// Built by the label policy with exactly the label names of the metric
/// it is recorded against, in the same order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    pairs: Vec<(String, String)>,
}

impl LabelSet {
    // ---

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            pairs: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    /// Value for `name`, if present.
    pub fn get(&self, name: &str) -> Option<&str> {
        // ---
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Label values in positional order, ready for `with_label_values`.
    pub fn values(&self) -> Vec<&str> {
        self.pairs.iter().map(|(_, v)| v.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// `true` when the names match `label_names` exactly, in order.
    pub fn matches(&self, label_names: &[String]) -> bool {
        // ---
        self.pairs.len() == label_names.len()
            && self
                .pairs
                .iter()
                .zip(label_names)
                .all(|((name, _), expected)| name == expected)
    }
}
