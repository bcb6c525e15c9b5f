//! # Gymhub API Main Entry Point

use gymhub::{
    config::ConfigLoader, db::init_pool, seeds::seed_plans, server::run_server,
    telemetry::init_tracing,
};
use migration::{Migrator, MigratorTrait};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from layered env files and variables
    let config_loader = ConfigLoader::new();
    let config = config_loader.load()?;

    init_tracing(&config)?;

    tracing::info!("Loaded configuration for profile: {}", config.profile);
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::info!("Configuration: {}", redacted_json);
    }

    let db = init_pool(&config).await?;
    Migrator::up(&db, None).await?;
    seed_plans(&db).await?;

    run_server(config, db).await
}
