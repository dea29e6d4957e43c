//! Backend entry-point: loads settings, prepares storage, and serves the API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use backend::inbound::http::health::HealthState;
use backend::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use backend::settings::ServerSettings;

use server::{ServerConfig, create_server};

/// Apply migrations and open the pool for `database_url`.
async fn connect_database(database_url: &str, max_connections: u32) -> std::io::Result<DbPool> {
    let applied = run_pending_migrations(database_url)
        .await
        .map_err(std::io::Error::other)?;
    info!(applied, "database schema is current");
    DbPool::new(PoolConfig::new(database_url).with_max_size(max_connections))
        .await
        .map_err(std::io::Error::other)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().map_err(|err| std::io::Error::other(err.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let token_secret = settings.token_secret().map_err(std::io::Error::other)?;
    if settings.token_secret_file.is_none() {
        warn!("using a temporary token secret; tokens will not survive a restart");
    }

    let mut config = ServerConfig::new(bind_addr, token_secret, settings.token_ttl());
    if let Some(database_url) = settings.database_url.as_deref() {
        let pool = connect_database(database_url, settings.db_max_connections()).await?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "listening");
    let outcome = server.await;
    health_state.mark_unhealthy();
    outcome
}
