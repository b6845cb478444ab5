// Test helpers are intentionally partially used
#![allow(dead_code)]

use crate::domain::RequestContext;

/// In-memory [`RequestContext`] for unit tests.
#[derive(Debug, Clone, Default)]
pub(crate) struct StubContext {
    pub method: String,
    pub path: String,
    pub route: Option<String>,
    pub headers: Vec<(String, String)>,
    pub response_code: Option<u16>,
    pub status: Option<u16>,
}

impl StubContext {
    // ---

    pub fn new(method: &str, path: &str) -> Self {
        // ---
        Self {
            method: method.to_string(),
            path: path.to_string(),
            ..Self::default()
        }
    }

    pub fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    pub fn with_route(mut self, route: &str) -> Self {
        self.route = Some(route.to_string());
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_response_code(mut self, code: u16) -> Self {
        self.response_code = Some(code);
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

impl RequestContext for StubContext {
    // ---
    fn method(&self) -> &str {
        &self.method
    }

    fn path(&self) -> &str {
        &self.path
    }

    fn route(&self) -> Option<&str> {
        self.route.as_deref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        // ---
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn response_code(&self) -> Option<u16> {
        self.response_code
    }

    fn status(&self) -> Option<u16> {
        self.status
    }
}
