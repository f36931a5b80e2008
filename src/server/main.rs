//! Query server for spatial GeoJSON operations.
//!
//! Serves the `/q/*` endpoints used by the Leaflet front end, backed by a
//! PostGIS database.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use geoquery::api::{router, AppState};
use geoquery::config::{AppConfig, Args};
use geoquery::db::PgConnectionFactory;
use geoquery::Dispatcher;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| args.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .init();

    let config = AppConfig::load(&args).context("Failed to load configuration")?;

    info!("Geoquery Server");
    info!(
        "Tables: features='{}', regions='{}'",
        config.tables.features, config.tables.regions
    );

    let connections = PgConnectionFactory::connect_lazy(&config.database_url, &config.pool)
        .context("Failed to create database pool")?;

    let dispatcher = Dispatcher::new(config.tables.clone(), Arc::new(connections));
    let app = router(AppState::new(dispatcher));

    info!("Starting server on {}", config.listen);

    let listener = tokio::net::TcpListener::bind(&config.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}
