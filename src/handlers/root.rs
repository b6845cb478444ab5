use axum::response::IntoResponse;

pub async fn root_handler() -> impl IntoResponse {
    let version = env!("CARGO_PKG_VERSION");
    format!(
        r#"Welcome to the Axum HTTP Metrics demo 👋
Version: {version}

Available endpoints:
  - GET  /              - This page
  - POST /              - Echo the method
  - GET  /delay         - Respond after one second
  - GET  /error/{{code}}  - Respond with the given status code
  - GET  /users/{{id}}    - Route template demo
  - GET  /panic         - Handler panic demo
  - GET  /health        - Light health check
  - GET  /metrics       - Prometheus metrics

Every request except the metrics endpoint is counted and timed.
"#
    )
}

pub async fn root_post_handler() -> &'static str {
    "POST /"
}
