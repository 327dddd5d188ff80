//! Park'it shell - the `parkit` binary.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use parkit_core::ParkingService;
use parkit_db::{Database, DbConfig};
use parkit_shell::config::ENV_LOG;
use parkit_shell::{menu, ShellConfig, StdConsole};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    let config = ShellConfig::load().context("Failed to load configuration")?;

    // PARKIT_LOG already folded into the config; RUST_LOG wins over the file.
    let filter = match std::env::var(ENV_LOG) {
        Ok(_) => EnvFilter::try_new(&config.logging.filter),
        Err(_) => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.logging.filter)),
    }
    .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();

    info!("Initializing Parking System");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(config))
}

async fn run(config: ShellConfig) -> Result<()> {
    let db_path = config.database_path();
    if let Some(dir) = db_path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }

    let db = Database::new(DbConfig::new(&db_path))
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    if !db.health_check().await {
        bail!("Database {} is not responding", db_path.display());
    }

    let service = ParkingService::new(
        Arc::new(db.spots()),
        Arc::new(db.tickets()),
        Arc::new(StdConsole),
    )
    .with_schedule(config.fare)
    .with_options(config.service_options());

    info!(database = %db_path.display(), "App initialized");

    let outcome = menu::run(&service, &StdConsole).await;
    db.close().await;

    outcome.context("Console failed")
}
