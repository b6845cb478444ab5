mod counters;
mod registry;

pub use registry::MetricRegistry;

// Re-export utilities for internal use within this module
pub(crate) use counters::{register_request_counter, register_request_duration};

/// Creates a new Prometheus metric registry with process metrics attached.
///
/// Each call returns an independent registry; nothing is installed
/// globally.
pub fn create() -> crate::error::Result<MetricRegistry> {
    // ---
    tracing::info!("Initializing Prometheus metric registry");

    let registry = MetricRegistry::new();
    registry.collect_defaults()?;

    Ok(registry)
}
