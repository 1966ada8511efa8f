//! Rentledger API Server
//!
//! Main entry point for the posting and reporting service.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rentledger_api::{AppState, create_router};
use rentledger_db::{PgStore, connect};
use rentledger_shared::AppConfig;
use rentledger_shared::jwt::{JwtConfig, JwtService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rentledger=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = connect(&config)
        .await
        .context("Failed to connect to database")?;
    info!(
        max_open_conns = config.db_max_open_conns,
        query_timeout = ?config.query_timeout,
        "Connected to database"
    );

    let jwt_service = JwtService::new(JwtConfig::with_secret(config.jwt_secret.clone()));
    let state = AppState::new(PgStore::new(db), jwt_service, config.query_timeout);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.addr))?;
    info!("Server listening on {}", config.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received");
    }
}
