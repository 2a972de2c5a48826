// Main entry point for the weights API server

use std::sync::Arc;

use anyhow::{Context, Result};
use factsheet_weights::WeightsWorkflow;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use weights_server::{build_app, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,factsheet_weights=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting factsheet weights API");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    let mapping = config.load_mapping()?;
    tracing::info!(mapped = mapping.len(), "Configuration loaded");

    // Connect to database (tables are created on connect)
    tracing::info!("Connecting to database...");
    let store = config.connect_store().await?;
    tracing::info!("Database connected");

    let workflow = WeightsWorkflow::production(Arc::new(mapping), store, config.pipeline.clone());
    let app = build_app(Arc::new(workflow));

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/api/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
