//! Migrate mode: connect, apply migrations, exit

use anyhow::{Context, Result};
use tracing::info;

use crate::config::get_config;
use crate::runtime::lifetime::startup::install_crypto_provider;
use crate::storage::{AnalyticsStore, SeaOrmStorage};

pub async fn run_migrate() -> Result<()> {
    let config = get_config();
    install_crypto_provider();

    // SeaOrmStorage::new 在连接后执行全部迁移
    let storage = SeaOrmStorage::new(&config.database)
        .await
        .context("Failed to migrate database")?;

    info!(
        "Migrations applied to {} database",
        storage.backend_name().to_uppercase()
    );

    storage
        .get_db()
        .clone()
        .close()
        .await
        .context("Failed to close database connection")?;
    Ok(())
}
