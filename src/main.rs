use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use stuff_inventory::config::AppConfig;
use stuff_inventory::database::{connect_pool, PgStore};
use stuff_inventory::{app, AppState};

/// Personal inventory web server
#[derive(Debug, Parser)]
#[command(name = "stuff-inventory", version, about)]
struct Args {
    /// Interface to bind (overrides HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT)
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and OIDC_* settings
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("stuff_inventory=debug,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let mut config = AppConfig::from_env();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    config.validate().context("invalid configuration")?;
    tracing::info!("Starting stuff-inventory in {:?} mode", config.environment);

    let pool = connect_pool(&config.database).context("failed to create database pool")?;
    let store = Arc::new(PgStore::new(pool, &config.database));

    let bind_addr = config.bind_addr();
    let state = AppState::new(config, store).context("invalid identity provider settings")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("App server listening on http://{}", bind_addr);
    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
