//! SmartPark entry-point: loads settings, prepares the store, and serves the
//! REST API with OpenAPI docs.

mod server;

use std::path::Path;

use actix_web::cookie::{Key, SameSite};
use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{AppSettings, ServerConfig, create_server};
use smartpark::inbound::http::health::HealthState;
use smartpark::outbound::persistence::run_pending_migrations;

fn load_session_key(path: &Path, allow_ephemeral: bool) -> std::io::Result<Key> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            if cfg!(debug_assertions) || allow_ephemeral {
                warn!(path = %path.display(), error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {e}",
                    path.display()
                )))
            }
        }
    }
}

async fn migrate(database_url: String) -> std::io::Result<()> {
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
        .await
        .map_err(|e| std::io::Error::other(format!("migration task failed: {e}")))?
        .map_err(std::io::Error::other)?;
    info!(applied, "database migrations complete");
    Ok(())
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

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(format!("failed to load settings: {e}")))?;
    let key = load_session_key(
        &settings.session_key_file(),
        settings.session_allow_ephemeral,
    )?;
    let bind_addr = settings
        .bind_addr()
        .map_err(|e| std::io::Error::other(format!("invalid bind address: {e}")))?;

    let mut config = ServerConfig::new(
        key,
        settings.session_cookie_secure,
        SameSite::Lax,
        bind_addr,
    )
    .with_staging_plan(settings.staging_plan());
    if let Some(database_url) = settings.database_url.clone() {
        if settings.run_migrations {
            migrate(database_url.clone()).await?;
        }
        config = config.with_database_url(database_url);
    }

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %config.bind_addr(), "starting server");
    create_server(health_state, config)?.await
}
