//! Payroll engine HTTP service.
//!
//! Usage: `payroll-engine [CONFIG_PATH]`. Without a path, built-in defaults
//! are used; environment variables override either.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use payroll_engine::api::{AppState, create_router};
use payroll_engine::config::ConfigLoader;
use payroll_engine::storage::{PayrollSources, SqliteStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let loader = match std::env::args().nth(1) {
        Some(path) => ConfigLoader::load(&path)
            .with_context(|| format!("loading configuration from {}", path))?,
        None => ConfigLoader::defaults(),
    };
    let config = loader.with_env_overrides()?.into_config();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    let store = SqliteStore::connect(&config.database.url, config.database.max_connections)
        .await
        .with_context(|| format!("opening database {}", config.database.url))?;
    let router = create_router(AppState::new(PayrollSources::from_store(store)));

    let address = config.server.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {}", address))?;
    info!(address = %address, database = %config.database.url, "Payroll engine listening");

    axum::serve(listener, router).await?;
    Ok(())
}
