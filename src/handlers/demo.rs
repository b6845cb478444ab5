//! Demo routes exercising the interesting instrumentation paths: slow
//! responses, arbitrary status codes, templated routes and handler panics.

use axum::{extract::Path, http::StatusCode, Json};
use serde::Serialize;
use std::time::Duration;

/// Delay applied by [`delay_handler`].
pub const DEMO_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Serialize)]
pub struct UserResponse {
    id: u64,
}

/// Handler for `GET /delay`: responds after [`DEMO_DELAY`].
pub async fn delay_handler() -> &'static str {
    // ---
    tokio::time::sleep(DEMO_DELAY).await;
    "GET /delay"
}

/// Handler for `GET /error/{code}`.
///
/// Responds with the requested status code. Codes outside `100..=999`
/// produce `400 Bad Request`.
pub async fn error_handler(Path(code): Path<String>) -> StatusCode {
    // ---
    code.parse::<u16>()
        .ok()
        .and_then(|c| StatusCode::from_u16(c).ok())
        .unwrap_or(StatusCode::BAD_REQUEST)
}

/// Handler for `GET /users/{id}`.
pub async fn get_user(Path(id): Path<u64>) -> Json<UserResponse> {
    Json(UserResponse { id })
}

/// Handler for `GET /panic`: always panics.
pub async fn panic_handler() -> &'static str {
    panic!("demo handler panic")
}
