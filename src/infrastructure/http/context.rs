use crate::domain::RequestContext;
use axum::{
    extract::{MatchedPath, Request},
    http::{HeaderMap, Method, StatusCode},
};

/// [`RequestContext`] captured from an Axum request.
///
/// The matched route is only known when the middleware runs inside the
/// router (added with `Router::layer`), which is how
/// [`crate::HttpMetrics::attach`] installs it.
#[derive(Debug, Clone)]
pub struct HttpRequestContext {
    method: Method,
    path: String,
    route: Option<String>,
    headers: HeaderMap,
    response_code: Option<u16>,
    status: Option<u16>,
}

impl HttpRequestContext {
    // ---

    pub fn from_request(request: &Request) -> Self {
        // ---
        let route = request
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string());

        Self {
            method: request.method().clone(),
            path: request.uri().path().to_string(),
            route,
            headers: request.headers().clone(),
            response_code: None,
            status: None,
        }
    }

    /// Records the status of the response returned by the handler.
    pub fn set_response_code(&mut self, code: StatusCode) {
        self.response_code = Some(code.as_u16());
    }

    /// Records a status decided by error handling rather than a response.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status.as_u16());
    }
}

impl RequestContext for HttpRequestContext {
    // ---
    fn method(&self) -> &str {
        self.method.as_str()
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}
