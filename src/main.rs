use anyhow::Result;
use axum_http_metrics::{create_router_with, user_agent_label, AppConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a local .env before reading configuration
    dotenvy::dotenv().ok();

    // Initialize tracing subscriber to log to stdout
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    let metrics = config
        .metrics
        .with_dynamic_label("user_agent", user_agent_label);

    // Configuration errors stop here, before anything is served
    let app = create_router_with(metrics)?;

    info!("Starting at endpoint:{}", config.server.bind_addr);
    info!("Starting Axum HTTP Metrics demo v{}...", env!("CARGO_PKG_VERSION"));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // ---
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
    }
}
