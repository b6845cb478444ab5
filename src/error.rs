//! Errors raised while building the metrics middleware.
//!
//! Every variant except [`MetricsError::Encode`] is a configuration error:
//! it is raised before any request is served and must stop the server from
//! starting.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MetricsError>;

#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("label '{0}' is reserved")]
    ReservedLabel(String),

    #[error("label '{0}' is configured more than once")]
    DuplicateLabel(String),

    #[error("label '{0}' is reserved by Prometheus")]
    InvalidLabelName(String),

    #[error("metric '{0}' is already registered")]
    DuplicateMetric(String),

    #[error("default process metrics are already collected")]
    DefaultsAlreadyCollected,

    #[error("invalid duration buckets: {0}")]
    InvalidBuckets(String),

    #[error("invalid metrics path '{0}': must be a literal path starting with '/'")]
    InvalidMetricsPath(String),

    #[error("metrics path '{0}' collides with an existing route")]
    RouteConflict(String),

    #[error("failed to encode metrics: {0}")]
    Encode(String),

    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

impl MetricsError {
    /// `true` for errors that must prevent the server from starting.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, MetricsError::Encode(_))
    }
}
