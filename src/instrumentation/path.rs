//! Path normalization for the `path` label.
//!
//! Raw request paths carry identifiers (`/users/8812/orders/17`) that would
//! give every request its own series. Numeric segments are collapsed into a
//! fixed placeholder so the label stays bounded.

/// Token substituted for numeric path segments.
pub const ID_PLACEHOLDER: &str = ":id";

/// Collapses numeric path segments into [`ID_PLACEHOLDER`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PathNormalizer;

impl PathNormalizer {
    // ---

    pub fn new() -> Self {
        Self
    }

    /// See [`normalize_path`].
    pub fn normalize(&self, path: &str) -> String {
        normalize_path(path)
    }
}

/// Replaces every `/`-delimited segment made only of ASCII digits with
/// `:id`.
///
/// Everything from the first `?` or `#` onward is copied verbatim, as are
/// the separators themselves. The function is idempotent.
///
/// ```
/// use axum_http_metrics::normalize_path;
///
/// assert_eq!(normalize_path("/users/123/posts/45"), "/users/:id/posts/:id");
/// assert_eq!(normalize_path("/users/123?x=1"), "/users/:id?x=1");
/// assert_eq!(normalize_path("/users"), "/users");
/// ```
pub fn normalize_path(path: &str) -> String {
    // ---
    let boundary = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let (segments, suffix) = path.split_at(boundary);

    let mut normalized = String::with_capacity(path.len());
    for (i, segment) in segments.split('/').enumerate() {
        if i > 0 {
            normalized.push('/');
        }
        if is_numeric(segment) {
            normalized.push_str(ID_PLACEHOLDER);
        } else {
            normalized.push_str(segment);
        }
    }
    normalized.push_str(suffix);

    normalized
}

fn is_numeric(segment: &str) -> bool {
    !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit())
}
