//! Axum middleware wiring the instrumentation hooks into the request path.

use super::context::HttpRequestContext;
use crate::instrumentation::InstrumentationHooks;
use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use futures::FutureExt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Middleware that counts and times every request passing through it.
///
/// - Before the handler: starts the request timer.
/// - Handler returned a response: finalizes with the response status.
/// - Handler panicked: finalizes with status 500, then resumes the panic
///   so the host's own panic handling is unchanged.
///
/// Install with `axum::middleware::from_fn_with_state`; see
/// [`crate::HttpMetrics::attach`].
pub async fn track_metrics(
    State(hooks): State<Arc<InstrumentationHooks>>,
    request: Request,
    next: Next,
) -> Response {
    // ---
    let mut ctx = HttpRequestContext::from_request(&request);
    let mut instrumentation = hooks.on_request(&ctx);

    match AssertUnwindSafe(next.run(request)).catch_unwind().await {
        Ok(response) => {
            ctx.set_response_code(response.status());
            hooks.on_after_handle(&mut instrumentation, &ctx);
            response
        }
        Err(payload) => {
            ctx.set_status(StatusCode::INTERNAL_SERVER_ERROR);
            hooks.on_error(&mut instrumentation, &ctx);
            panic::resume_unwind(payload)
        }
    }
}
