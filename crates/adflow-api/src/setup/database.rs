//! Database pool setup and migrations.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use adflow_core::Config;

pub async fn setup_database(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_timeout_seconds))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("../adflow-db/migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    tracing::info!("Database connected and migrated");
    Ok(pool)
}
