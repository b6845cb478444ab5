//! Abstractions over the host server's per-request context.
//!
//! The instrumentation core never depends on a concrete web framework. It
//! reads request data through [`RequestContext`] and evaluates user-supplied
//! labels through [`LabelExtractor`].

use anyhow::Result;

/// Read-only view of a single in-flight request, provided by the host.
///
/// `response_code` and `status` are only meaningful once the handler has
/// run; before that both return `None`.
pub trait RequestContext: Send + Sync {
    // ---
    /// Request method, verbatim (`GET`, `POST`, ...).
    fn method(&self) -> &str;

    /// Raw request path as received.
    fn path(&self) -> &str;

    /// Route template matched by the router (e.g. `/users/{id}`), if any.
    fn route(&self) -> Option<&str>;

    /// Request header value by name, if present and valid UTF-8.
    fn header(&self, name: &str) -> Option<&str>;

    /// Status code carried by the handler's response.
    fn response_code(&self) -> Option<u16>;

    /// Status explicitly set on the context, e.g. by error handling.
    fn status(&self) -> Option<u16>;
}

/// Computes the value of a dynamic label from the request context.
///
/// Extractors run twice per request (start and end phase) and must be free
/// of side effects. Errors and panics are contained by the label policy.
pub trait LabelExtractor: Send + Sync + 'static {
    fn evaluate(&self, ctx: &dyn RequestContext) -> Result<String>;
}

impl<F> LabelExtractor for F
where
    F: Fn(&dyn RequestContext) -> Result<String> + Send + Sync + 'static,
{
    fn evaluate(&self, ctx: &dyn RequestContext) -> Result<String> {
        self(ctx)
    }
}
