// Main entry point for API server

use std::sync::Arc;

use anyhow::{Context, Result};
use extraction::{HttpFetcher, MemoryStore, ProxyPool};
use server_core::{
    server::{build_app, AppState},
    Config,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,server_core=debug,extraction=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();

    tracing::info!("Starting Locator Extraction API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        settings = ?config.pool_settings,
        proxy_list = ?config.proxy_list_file,
        "Configuration loaded"
    );

    // Proxy pool
    let pool = Arc::new(ProxyPool::with_settings(config.pool_settings.clone()));
    let enrolled = config
        .enroll_proxy_list(&pool)
        .context("Failed to enroll startup proxy list")?;
    if enrolled > 0 {
        tracing::info!(enrolled, protocol = %config.proxy_list_type, "Startup proxies enrolled");
    }

    // Build application
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let state = AppState::new(pool, Arc::new(fetcher), Arc::new(MemoryStore::new()));
    let app = build_app(state, &config.allowed_origins);

    // Start server
    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
