// src/config.rs

//! Application configuration loaded from environment variables.
//!
//! This module defines all startup-time configuration for the service.
//! Configuration is validated eagerly and failures are treated as
//! deployment errors rather than recoverable runtime conditions.

use anyhow::Result;

// ============================================================
// Local macros (config-only, intentionally explicit)
// ============================================================

/// Reads an optional environment variable and attempts to parse it.
///
/// If the variable is missing or cannot be parsed, the provided
/// default value is used. This macro is appropriate for non-critical
/// tuning parameters where fallback behavior is acceptable.
macro_rules! optional_env_parse {
    // ---
    ($key:literal, $ty:ty, $default:expr) => {
        std::env::var($key)
            .ok()
            .and_then(|v| v.parse::<$ty>().ok())
            .unwrap_or($default)
    };
}

/// Reads an optional environment variable through a fallible parser.
///
/// A missing variable yields the default. A present but malformed value
/// is a configuration error naming the variable.
macro_rules! optional_env_with {
    // ---
    ($key:literal, $parser:expr, $default:expr) => {
        match std::env::var($key) {
            Ok(raw) => $parser(&raw).map_err(|err| {
                anyhow::anyhow!(concat!("Invalid configuration: ", $key, ": {}"), err)
            })?,
            Err(_) => $default,
        }
    };
}

#[cfg(test)]
/// Asserts that a configuration constructor fails due to a malformed
/// environment variable.
///
/// This macro is intended for config unit tests only and enforces
/// consistent error messages across failure cases.
macro_rules! assert_invalid_config {
    // ---
    ($expr:expr, $key:literal) => {{
        let err = $expr.expect_err("expected configuration error");
        assert!(
            err.to_string()
                .contains(concat!("Invalid configuration: ", $key)),
            "unexpected error: {err}"
        );
    }};
}

// ============================================================
// Public configuration facade
// ============================================================

/// Aggregated application configuration.
///
/// This is the single source of truth for startup configuration.
/// All configuration is validated eagerly during initialization.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: server::ServerConfig,
    pub metrics: metrics::MetricsConfig,
}

impl AppConfig {
    /// Loads and validates all application configuration from the environment.
    ///
    /// # Errors
    /// Returns an error if any configuration value is malformed.
    /// This function is intended to be called exactly once at startup.
    pub fn from_env() -> Result<Self> {
        // ---
        Ok(Self {
            server: server::ServerConfig::from_env()?,
            metrics: metrics::MetricsConfig::from_env()?,
        })
    }
}

// ============================================================
// Server configuration
// ============================================================

mod server {
    // ---
    use super::*;

    /// Listener configuration for the HTTP server.
    #[derive(Debug, Clone)]
    pub struct ServerConfig {
        /// Socket address to bind. Defaults to `127.0.0.1:8080`.
        pub bind_addr: String,
    }

    impl ServerConfig {
        /// Builds a [`ServerConfig`] from environment variables.
        pub fn from_env() -> Result<Self> {
            // ---
            let bind_addr =
                std::env::var("API_BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

            Ok(Self { bind_addr })
        }
    }
}
pub use server::ServerConfig;

// ============================================================
// Metrics configuration
// ============================================================

mod metrics {
    // ---
    use super::*;
    use crate::domain::{LabelExtractor, RequestContext};
    use crate::error::MetricsError;
    use std::fmt;
    use std::sync::Arc;

    /// Default endpoint serving the exposition text.
    pub const DEFAULT_METRICS_PATH: &str = "/metrics";

    /// Default upper bounds (seconds) of the request duration histogram.
    pub const DEFAULT_DURATION_BUCKETS: [f64; 6] = [0.003, 0.03, 0.1, 0.3, 1.5, 10.0];

    /// Configuration of the HTTP metrics middleware.
    ///
    /// Static and dynamic labels keep their insertion order; that order is
    /// the order of the extra label columns after `method, path, status`.
    #[derive(Clone)]
    pub struct MetricsConfig {
        /// Path of the metrics endpoint. Requests whose path ends with it are
        /// never instrumented. Defaults to `/metrics`.
        pub metrics_path: String,

        /// Ascending histogram bucket upper bounds, in seconds.
        pub duration_buckets: Vec<f64>,

        /// Constant labels attached to every observation.
        pub static_labels: Vec<(String, String)>,

        /// Labels computed per request by an extractor.
        pub dynamic_labels: Vec<(String, Arc<dyn LabelExtractor>)>,

        /// Label `path` with the matched route template when one exists.
        /// Defaults to `true`.
        pub use_route_path: bool,
    }

    impl Default for MetricsConfig {
        fn default() -> Self {
            // ---
            Self {
                metrics_path: DEFAULT_METRICS_PATH.to_string(),
                duration_buckets: DEFAULT_DURATION_BUCKETS.to_vec(),
                static_labels: Vec::new(),
                dynamic_labels: Vec::new(),
                use_route_path: true,
            }
        }
    }

    impl fmt::Debug for MetricsConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            // ---
            let dynamic: Vec<&str> = self.dynamic_labels.iter().map(|(n, _)| n.as_str()).collect();
            f.debug_struct("MetricsConfig")
                .field("metrics_path", &self.metrics_path)
                .field("duration_buckets", &self.duration_buckets)
                .field("static_labels", &self.static_labels)
                .field("dynamic_labels", &dynamic)
                .field("use_route_path", &self.use_route_path)
                .finish()
        }
    }

    impl MetricsConfig {
        // ---

        /// Builds a [`MetricsConfig`] from environment variables.
        ///
        /// Dynamic labels cannot be expressed in the environment; add them
        /// with [`MetricsConfig::with_dynamic_label`].
        ///
        /// # Errors
        /// Returns an error if buckets or static labels are malformed.
        pub fn from_env() -> Result<Self> {
            // ---
            let metrics_path = std::env::var("AXUM_METRICS_PATH")
                .unwrap_or_else(|_| DEFAULT_METRICS_PATH.to_string());
            let duration_buckets = optional_env_with!(
                "AXUM_METRICS_BUCKETS",
                parse_buckets,
                DEFAULT_DURATION_BUCKETS.to_vec()
            );
            let static_labels =
                optional_env_with!("AXUM_METRICS_STATIC_LABELS", parse_static_labels, Vec::new());
            let use_route_path = optional_env_parse!("AXUM_METRICS_USE_ROUTE_PATH", bool, true);

            Ok(Self {
                metrics_path,
                duration_buckets,
                static_labels,
                dynamic_labels: Vec::new(),
                use_route_path,
            })
        }

        pub fn with_metrics_path(mut self, path: impl Into<String>) -> Self {
            self.metrics_path = path.into();
            self
        }

        pub fn with_duration_buckets(mut self, buckets: impl Into<Vec<f64>>) -> Self {
            self.duration_buckets = buckets.into();
            self
        }

        pub fn with_static_label(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
            self.static_labels.push((name.into(), value.into()));
            self
        }

        /// Adds a label whose value is computed from each request.
        ///
        /// The extractor runs at request start and again at request end. An
        /// error or panic yields an empty label value.
        pub fn with_dynamic_label<F>(mut self, name: impl Into<String>, extractor: F) -> Self
        where
            F: Fn(&dyn RequestContext) -> anyhow::Result<String> + Send + Sync + 'static,
        {
            let extractor: Arc<dyn LabelExtractor> = Arc::new(extractor);
            self.dynamic_labels.push((name.into(), extractor));
            self
        }

        /// Adds a dynamic label backed by a shared [`LabelExtractor`].
        pub fn with_extractor(
            mut self,
            name: impl Into<String>,
            extractor: Arc<dyn LabelExtractor>,
        ) -> Self {
            self.dynamic_labels.push((name.into(), extractor));
            self
        }

        pub fn with_use_route_path(mut self, use_route_path: bool) -> Self {
            self.use_route_path = use_route_path;
            self
        }

        /// Checks the endpoint path and histogram buckets.
        ///
        /// The endpoint must be a literal path: route parameters and
        /// wildcards are rejected. Label names are validated by the label
        /// policy.
        pub fn validate(&self) -> std::result::Result<(), MetricsError> {
            // ---
            let literal = !self.metrics_path.contains(&['{', '}', '*'][..]);
            if !self.metrics_path.starts_with('/') || !literal {
                return Err(MetricsError::InvalidMetricsPath(self.metrics_path.clone()));
            }
            validate_buckets(&self.duration_buckets)
        }
    }

    fn validate_buckets(buckets: &[f64]) -> std::result::Result<(), MetricsError> {
        // ---
        if buckets.is_empty() {
            return Err(MetricsError::InvalidBuckets("at least one bucket is required".into()));
        }
        if let Some(bad) = buckets.iter().find(|b| !b.is_finite() || **b <= 0.0) {
            return Err(MetricsError::InvalidBuckets(format!(
                "bucket {bad} must be a positive finite number"
            )));
        }
        if let Some(pair) = buckets.windows(2).find(|w| w[0] >= w[1]) {
            return Err(MetricsError::InvalidBuckets(format!(
                "buckets must be strictly ascending ({} >= {})",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }

    /// Parses `"0.01,0.1,1"` into bucket bounds.
    pub(super) fn parse_buckets(raw: &str) -> Result<Vec<f64>> {
        // ---
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| anyhow::anyhow!("'{s}' is not a number"))
            })
            .collect()
    }

    /// Parses `"service=api,region=eu"` into ordered label pairs.
    pub(super) fn parse_static_labels(raw: &str) -> Result<Vec<(String, String)>> {
        // ---
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|pair| {
                let (name, value) = pair
                    .split_once('=')
                    .ok_or_else(|| anyhow::anyhow!("'{pair}' is not of the form name=value"))?;
                let name = name.trim();
                if name.is_empty() {
                    anyhow::bail!("'{pair}' has an empty label name");
                }
                Ok((name.to_string(), value.trim().to_string()))
            })
            .collect()
    }
}
pub use metrics::{MetricsConfig, DEFAULT_DURATION_BUCKETS, DEFAULT_METRICS_PATH};

// ============================================================
// Tests
// ============================================================
