pub mod http;
pub mod metrics;

// Re-export the adapters for easy access
pub use http::{track_metrics, HttpRequestContext};
pub use metrics::{create_prom_registry, MetricRegistry};
