mod context;
mod middleware;

pub use context::HttpRequestContext;
pub use middleware::track_metrics;
