//! factoryflow HTTP server.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use factoryflow::client::RestFactoryClient;
use factoryflow::config::FactoryConfig;
use factoryflow_server::logging::{self, LogFormat};
use factoryflow_server::{serve, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init(LogFormat::from_env())?;

    let config = Arc::new(FactoryConfig::from_env().context("Failed to load configuration")?);
    info!(
        version = %config.app_version,
        factory = %config.datafactory_name,
        resource_group = %config.resource_group_name,
        "Configuration loaded"
    );

    let client =
        RestFactoryClient::from_config(&config).context("Failed to create factory client")?;
    let state = Arc::new(AppState::new(Arc::new(client), config.clone()));

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve(listener, state).await.context("Server error")?;
    info!("Server stopped");
    Ok(())
}
