// Gateway module - controls public API for handlers
// Modules are private, only exported symbols are public

mod demo;
mod health;
mod metrics;
mod root;

// Core handlers
pub use health::health_check;
pub use metrics::metrics_handler;
pub use root::{root_handler, root_post_handler};

// Demo handlers
pub use demo::{delay_handler, error_handler, get_user, panic_handler, DEMO_DELAY};
