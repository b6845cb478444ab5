//! Prometheus-backed metric registry.
//!
//! Unlike a process-global recorder, each [`MetricRegistry`] owns its own
//! `prometheus::Registry`, so every middleware instance (and every test)
//! sees only its own series.

use crate::domain::MetricSpec;
use crate::error::{MetricsError, Result};
use prometheus::core::Collector;
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Holds every instrument exposed on the metrics endpoint.
pub struct MetricRegistry {
    registry: Registry,
    names: Mutex<HashSet<String>>,
    defaults_collected: AtomicBool,
}

impl MetricRegistry {
    // ---

    pub fn new() -> Self {
        // ---
        Self {
            registry: Registry::new(),
            names: Mutex::new(HashSet::new()),
            defaults_collected: AtomicBool::new(false),
        }
    }

    /// Registers a labeled counter described by `spec`.
    ///
    /// # Errors
    /// [`MetricsError::DuplicateMetric`] if the name is taken, or a
    /// prometheus error for invalid names.
    pub fn register_counter(&self, spec: &MetricSpec) -> Result<IntCounterVec> {
        // ---
        let counter = self.register_with(spec, |label_names| {
            IntCounterVec::new(Opts::new(&spec.name, &spec.help), label_names)
        })?;

        tracing::debug!(metric = %spec.name, labels = ?spec.label_names, "registered counter");
        Ok(counter)
    }

    /// Registers a labeled histogram with the given bucket upper bounds.
    pub fn register_histogram(&self, spec: &MetricSpec, buckets: &[f64]) -> Result<HistogramVec> {
        // ---
        let histogram = self.register_with(spec, |label_names| {
            let opts = HistogramOpts::new(&spec.name, &spec.help).buckets(buckets.to_vec());
            HistogramVec::new(opts, label_names)
        })?;

        tracing::debug!(
            metric = %spec.name,
            labels = ?spec.label_names,
            ?buckets,
            "registered histogram"
        );
        Ok(histogram)
    }

    /// Wires in the process-level collector (CPU, memory, file descriptors,
    /// threads, start time).
    ///
    /// # Errors
    /// [`MetricsError::DefaultsAlreadyCollected`] on the second call.
    pub fn collect_defaults(&self) -> Result<()> {
        // ---
        if self.defaults_collected.swap(true, Ordering::SeqCst) {
            return Err(MetricsError::DefaultsAlreadyCollected);
        }

        #[cfg(target_os = "linux")]
        {
            let collector = prometheus::process_collector::ProcessCollector::for_self();
            let taken: Vec<String> = collector.desc().iter().map(|d| d.fq_name.clone()).collect();

            self.registry.register(Box::new(collector))?;
            self.lock_names().extend(taken);
            tracing::debug!("registered process collector");
        }

        #[cfg(not(target_os = "linux"))]
        {
            tracing::info!("process metrics are only available on Linux; skipping");
        }

        Ok(())
    }

    /// Renders all registered instruments in the text exposition format.
    ///
    /// Each call gathers a fresh snapshot; concurrent increments land either
    /// before or after it, never half-way through a sample.
    pub fn serialize(&self) -> Result<String> {
        // ---
        let families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&families, &mut buffer)
            .map_err(|err| MetricsError::Encode(err.to_string()))?;

        String::from_utf8(buffer).map_err(|err| MetricsError::Encode(err.to_string()))
    }

    /// Content type of [`MetricRegistry::serialize`] output.
    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }

    /// Builds and registers an instrument under `spec.name`.
    ///
    /// The name is only claimed once registration succeeded, so a failed
    /// build leaves it free.
    fn register_with<C, F>(&self, spec: &MetricSpec, build: F) -> Result<C>
    where
        C: Collector + Clone + 'static,
        F: FnOnce(&[&str]) -> prometheus::Result<C>,
    {
        // ---
        let mut names = self.lock_names();

        if names.contains(&spec.name) {
            return Err(MetricsError::DuplicateMetric(spec.name.clone()));
        }

        let label_names: Vec<&str> = spec.label_names.iter().map(String::as_str).collect();
        let collector = build(&label_names)?;

        match self.registry.register(Box::new(collector.clone())) {
            Ok(()) => {}
            Err(prometheus::Error::AlreadyReg) => {
                return Err(MetricsError::DuplicateMetric(spec.name.clone()));
            }
            Err(err) => return Err(err.into()),
        }

        names.insert(spec.name.clone());
        Ok(collector)
    }

    fn lock_names(&self) -> MutexGuard<'_, HashSet<String>> {
        self.names
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MetricRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use anyhow::Result;

    fn spec(name: &str) -> MetricSpec {
        // ---
        MetricSpec::new(
            name,
            "test metric",
            vec!["method".to_string(), "status".to_string()],
        )
    }

    #[test]
    fn duplicate_registration_is_rejected() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        registry.register_counter(&spec("requests_total"))?;

        let err = registry
            .register_counter(&spec("requests_total"))
            .expect_err("second registration must fail");
        assert!(matches!(err, MetricsError::DuplicateMetric(ref n) if n == "requests_total"));

        // A histogram cannot take a counter's name either.
        let err = registry
            .register_histogram(&spec("requests_total"), &[0.1, 1.0])
            .expect_err("name collision across kinds must fail");
        assert!(matches!(err, MetricsError::DuplicateMetric(_)));

        Ok(())
    }

    #[test]
    fn separate_registries_do_not_collide() -> Result<()> {
        // ---
        let first = MetricRegistry::new();
        let second = MetricRegistry::new();
        first.register_counter(&spec("requests_total"))?;
        second.register_counter(&spec("requests_total"))?;
        Ok(())
    }

    #[test]
    fn invalid_metric_name_is_a_prometheus_error() {
        // ---
        let registry = MetricRegistry::new();
        let err = registry
            .register_counter(&spec("not a valid name"))
            .expect_err("invalid name must fail");
        assert!(matches!(err, MetricsError::Prometheus(_)));
        assert!(err.is_configuration());
    }

    #[test]
    fn serialize_renders_help_type_and_samples() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        let counter = registry.register_counter(&spec("requests_total"))?;
        let histogram = registry.register_histogram(&spec("latency_seconds"), &[0.1, 1.0])?;

        counter.with_label_values(&["GET", "200"]).inc();
        histogram.with_label_values(&["GET", "200"]).observe(0.5);

        let text = registry.serialize()?;
        assert!(text.contains("# HELP requests_total test metric"));
        assert!(text.contains("# TYPE requests_total counter"));
        assert!(text.contains(r#"requests_total{method="GET",status="200"} 1"#));
        assert!(text.contains("# TYPE latency_seconds histogram"));
        assert!(text.contains(r#"latency_seconds_bucket{method="GET",status="200",le="0.1"} 0"#));
        assert!(text.contains(r#"latency_seconds_bucket{method="GET",status="200",le="1"} 1"#));
        assert!(text.contains(r#"latency_seconds_count{method="GET",status="200"} 1"#));
        Ok(())
    }

    #[test]
    fn failed_build_leaves_name_free() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        let bad_labels = MetricSpec::new("requests_total", "test metric", vec!["not-valid".into()]);

        let err = registry
            .register_counter(&bad_labels)
            .expect_err("invalid label name must fail");
        assert!(matches!(err, MetricsError::Prometheus(_)));

        registry.register_counter(&spec("requests_total"))?;
        Ok(())
    }

    #[test]
    fn content_type_is_text_format() {
        // ---
        let registry = MetricRegistry::new();
        assert_eq!(registry.content_type(), "text/plain; version=0.0.4");
    }

    #[test]
    fn collect_defaults_only_once() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        registry.collect_defaults()?;

        let err = registry
            .collect_defaults()
            .expect_err("second call must fail");
        assert!(matches!(err, MetricsError::DefaultsAlreadyCollected));
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn collect_defaults_exposes_process_metrics() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        registry.collect_defaults()?;

        let text = registry.serialize()?;
        assert!(text.contains("process_cpu_seconds_total"));
        assert!(text.contains("process_resident_memory_bytes"));
        Ok(())
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn clash_with_process_metric_is_a_duplicate() -> Result<()> {
        // ---
        let registry = MetricRegistry::new();
        registry.collect_defaults()?;

        let clash = MetricSpec::new("process_cpu_seconds_total", "test metric", Vec::new());
        let err = registry
            .register_counter(&clash)
            .expect_err("process metric name is taken");
        assert!(matches!(err, MetricsError::DuplicateMetric(ref n) if n == "process_cpu_seconds_total"));
        Ok(())
    }
}
