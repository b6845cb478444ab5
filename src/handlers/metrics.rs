use crate::infrastructure::MetricRegistry;
use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Handler for the metrics endpoint.
///
/// Returns the registry's current state in the Prometheus text format for
/// scraping. The request itself is never instrumented.
pub async fn metrics_handler(State(registry): State<Arc<MetricRegistry>>) -> Response {
    // ---
    match registry.serialize() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, registry.content_type())],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to encode metrics: {}", err);
            (StatusCode::INTERNAL_SERVER_ERROR, "metric encode error").into_response()
        }
    }
}
