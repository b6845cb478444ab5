//! The metrics middleware as a whole: registry, instruments, label policy
//! and hooks, built together from one [`MetricsConfig`].

use crate::config::MetricsConfig;
use crate::error::{MetricsError, Result};
use crate::handlers::metrics_handler;
use crate::infrastructure::metrics::prometheus::{
    register_request_counter, register_request_duration,
};
use crate::infrastructure::{create_prom_registry, track_metrics, MetricRegistry};
use crate::instrumentation::{InstrumentationHooks, LabelPolicy, RequestTimer};
use axum::{middleware, routing::get, Router};
use std::sync::Arc;

/// Built HTTP metrics middleware.
///
/// Construction validates the whole configuration before creating any
/// instrument, so a failing build never leaves a half-initialized registry
/// behind.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Router};
/// use axum_http_metrics::{HttpMetrics, MetricsConfig};
///
/// # fn build() -> anyhow::Result<Router> {
/// let config = MetricsConfig::default()
///     .with_static_label("service", "my-app")
///     .with_dynamic_label("user_agent", |ctx| {
///         Ok(ctx.header("user-agent").unwrap_or("unknown").to_string())
///     });
///
/// let metrics = HttpMetrics::new(config)?;
/// let app = metrics.attach(Router::new().route("/", get(|| async { "hello" })));
/// # Ok(app)
/// # }
/// ```
pub struct HttpMetrics {
    metrics_path: String,
    registry: Arc<MetricRegistry>,
    hooks: Arc<InstrumentationHooks>,
}

impl HttpMetrics {
    // ---

    /// Validates `config` and builds the registry and hooks.
    ///
    /// # Errors
    /// Any configuration error: reserved or repeated label names, invalid
    /// buckets or metrics path, duplicate metric registration.
    pub fn new(config: MetricsConfig) -> Result<Self> {
        // ---
        config.validate()?;
        let policy = LabelPolicy::new(&config)?;

        let registry = create_prom_registry()?;
        let requests = register_request_counter(&registry, policy.label_names())?;
        let durations =
            register_request_duration(&registry, policy.label_names(), &config.duration_buckets)?;

        tracing::info!(
            metrics_path = %config.metrics_path,
            labels = ?policy.label_names(),
            use_route_path = config.use_route_path,
            "HTTP metrics enabled"
        );

        let hooks = InstrumentationHooks::new(
            config.metrics_path.clone(),
            policy,
            requests,
            RequestTimer::new(durations),
        );

        Ok(Self {
            metrics_path: config.metrics_path,
            registry: Arc::new(registry),
            hooks: Arc::new(hooks),
        })
    }

    pub fn metrics_path(&self) -> &str {
        &self.metrics_path
    }

    pub fn registry(&self) -> &Arc<MetricRegistry> {
        &self.registry
    }

    /// Fails if the metrics endpoint would land on one of `routes`.
    ///
    /// # Errors
    /// [`MetricsError::RouteConflict`].
    pub fn ensure_free_path<'a>(&self, routes: impl IntoIterator<Item = &'a str>) -> Result<()> {
        // ---
        match routes.into_iter().find(|route| *route == self.metrics_path) {
            Some(route) => Err(MetricsError::RouteConflict(route.to_string())),
            None => Ok(()),
        }
    }

    /// Adds the metrics endpoint to `router` and instruments all its routes.
    ///
    /// Call this after every route and fallback has been added; routes added
    /// later are not instrumented.
    ///
    /// # Panics
    /// If `router` already has a route at [`HttpMetrics::metrics_path`].
    /// Check with [`HttpMetrics::ensure_free_path`] first when the routes
    /// are known.
    pub fn attach<S>(&self, router: Router<S>) -> Router<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        // ---
        router
            .route(
                &self.metrics_path,
                get(metrics_handler).with_state(Arc::clone(&self.registry)),
            )
            .layer(middleware::from_fn_with_state(
                Arc::clone(&self.hooks),
                track_metrics,
            ))
    }
}
