//! Service entry point: loads settings, migrates the store, serves HTTP.

mod server;

use actix_web::web;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bitmirror::config::AppConfig;
use bitmirror::inbound::http::health::HealthState;
use bitmirror::outbound::persistence::{DbPool, run_migrations};
use bitmirror::wiring::Services;

use server::{ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let dotenv = dotenvy::dotenv();

    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    if let Err(e) = dotenv
        && !e.not_found()
    {
        warn!(error = %e, "failed to read .env");
    }

    let config = AppConfig::load().map_err(|e| {
        error!(error = %e, "invalid configuration");
        std::io::Error::other(e.to_string())
    })?;

    let applied = run_migrations(config.pool.database_url())
        .await
        .map_err(|e| std::io::Error::other(format!("migrations failed: {e}")))?;
    info!(applied, "database migrations applied");

    let pool = DbPool::new(config.pool.clone())
        .await
        .map_err(|e| std::io::Error::other(format!("database pool: {e}")))?;
    let services = Services::build(&config, &pool)
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    info!(
        bind_addr = %config.bind_addr,
        repositories = config.repositories.len(),
        "starting server"
    );
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(
        health_state.clone(),
        ServerConfig::new(config.bind_addr, services.http_state()),
    )?;

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
