//! Linked Art gateway HTTP server
//!
//! Usage:
//!   LA_GATEWAY_CONFIG=config/datasets.yaml cargo run --bin la_gateway

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use linked_art_gateway::{api, GatewayConfig, GatewayService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("linked_art_gateway=info,tower_http=debug")),
        )
        .init();

    let config_path =
        std::env::var("LA_GATEWAY_CONFIG").unwrap_or_else(|_| "config/datasets.yaml".to_string());
    let config = GatewayConfig::from_file(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path))?;

    let addr = std::env::var("LA_GATEWAY_ADDR").unwrap_or_else(|_| config.server.bind_addr.clone());

    let service = Arc::new(GatewayService::from_config(&config)?);
    let app = api::create_router(service);

    tracing::info!("Starting Linked Art gateway on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
