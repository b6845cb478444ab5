// src/lib.rs
use anyhow::Result;
use axum::{
    routing::{get, MethodRouter},
    Router,
};

use handlers::{
    delay_handler, error_handler, get_user, health_check, panic_handler, root_handler,
    root_post_handler,
};

// Public exports (visible outside this module)
pub mod domain;

// Internal-only exports (sibling access within this module)
mod config;
mod error;
mod handlers;
mod http_metrics;
mod infrastructure;
mod instrumentation;

pub use config::*;
pub use error::MetricsError;
pub use http_metrics::HttpMetrics;

// Publicly expose the instrumentation engine
pub use instrumentation::{
    normalize_path, // ---
    resolve_status,
    ActiveTimer,
    InstrumentationHooks,
    LabelPolicy,
    PathNormalizer,
    Phase,
    RequestInstrumentation,
    RequestState,
    RequestTimer,
    EXTRACTOR_FAULT_VALUE,
    ID_PLACEHOLDER,
    UNKNOWN_STATUS,
};

// Publicly expose the Axum and Prometheus adapters
pub use infrastructure::{
    create_prom_registry, // ---
    track_metrics,
    HttpRequestContext,
    MetricRegistry,
};

pub use handlers::DEMO_DELAY;

/// Dynamic label extractor reporting the `User-Agent` header, or `unknown`.
pub fn user_agent_label(ctx: &dyn domain::RequestContext) -> Result<String> {
    Ok(ctx.header("user-agent").unwrap_or("unknown").to_string())
}

/// Build the demo HTTP router with metrics configured from environment variables.
///
/// Adds the `user_agent` dynamic label on top of the environment settings.
pub fn create_router() -> Result<Router> {
    // ---
    let config = AppConfig::from_env()?;
    create_router_with(config.metrics.with_dynamic_label("user_agent", user_agent_label))
}

/// Build the demo HTTP router with an explicit metrics configuration.
///
/// # Errors
/// Fails if the metrics configuration is invalid, including a metrics path
/// that collides with a demo route; the server must not start.
pub fn create_router_with(config: MetricsConfig) -> Result<Router> {
    // ---
    tracing_subscriber::fmt::try_init().ok(); // Ignores if already initialized

    let http_metrics = HttpMetrics::new(config)?;

    let routes: [(&str, MethodRouter); 6] = [
        ("/", get(root_handler).post(root_post_handler)),
        ("/health", get(health_check)),
        ("/delay", get(delay_handler)),
        ("/error/{code}", get(error_handler)),
        ("/users/{id}", get(get_user)),
        ("/panic", get(panic_handler)),
    ];
    http_metrics.ensure_free_path(routes.iter().map(|(path, _)| *path))?;

    let router = routes
        .into_iter()
        .fold(Router::new(), |router, (path, method_router)| router.route(path, method_router));

    Ok(http_metrics.attach(router))
}
