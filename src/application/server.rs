use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

use crate::application::routes::app_router;
use crate::application::state::{AppState, AppStateConfig};
use crate::domain::content::default_categories;
use crate::infrastructure::convert::{CLOUDCONVERT_URL, ConversionClient};
use crate::infrastructure::database::Database;
use crate::infrastructure::generator::{Generator, Provider};

pub struct ServerConfig {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub provider: Provider,
    pub provider_api_key: Option<String>,
    pub provider_model: String,
    pub cooldown_hours: i64,
    pub convert_api_key: Option<String>,
    pub poll_interval_secs: u64,
    pub poll_max_attempts: u32,
}

pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    anyhow::ensure!(
        config.cooldown_hours > 0,
        "cooldown must be greater than zero hours"
    );
    anyhow::ensure!(
        config.poll_max_attempts > 0,
        "poll max attempts must be greater than zero"
    );

    let database = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let http_client = reqwest::ClientBuilder::new()
        .timeout(Duration::from_secs(30))
        .build()
        .context("failed to build HTTP client")?;

    let generator: Option<Arc<dyn Generator>> = match &config.provider_api_key {
        Some(key) if !key.is_empty() => Some(config.provider.build(
            http_client.clone(),
            config.provider.base_url().to_string(),
            key.clone(),
            config.provider_model.clone(),
        )),
        _ => {
            warn!("no provider API key configured; content endpoints will report missing configuration");
            None
        }
    };

    let converter = config
        .convert_api_key
        .as_ref()
        .filter(|key| !key.is_empty())
        .map(|key| {
            ConversionClient::new(
                http_client,
                CLOUDCONVERT_URL.to_string(),
                key.clone(),
            )
        });
    if converter.is_none() {
        warn!("no conversion API key configured; the convert endpoint will report missing configuration");
    }

    let state = AppState::from_database(
        &database,
        AppStateConfig {
            generator,
            categories: default_categories(chrono::Duration::hours(config.cooldown_hours)),
            converter,
            poll_interval: Duration::from_secs(config.poll_interval_secs),
            poll_max_attempts: config.poll_max_attempts,
        },
    );

    let listener = TcpListener::bind(config.bind_address)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_address))?;

    let app = app_router(state);

    info!(
        address = %config.bind_address,
        database = %config.database_url,
        "starting HTTP server"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    info!("server shutdown complete");

    Ok(())
}

#[allow(clippy::expect_used)] // Startup: panicking is appropriate if signal handlers fail
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
