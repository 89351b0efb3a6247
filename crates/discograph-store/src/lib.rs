// SPDX-License-Identifier: GPL-3.0-or-later
pub mod postgres_adapters;
pub mod queue;
pub mod repositories;

use anyhow::Result;
use discograph_config::AppConfig;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

pub async fn connect(config: &AppConfig) -> Result<PgPool> {
    info!(target: "store", "connecting to database");

    let pool = PgPoolOptions::new()
        .max_connections(config.database.pool_max_size)
        .connect(&config.database.url)
        .await?;

    info!(target: "store", "running migrations");
    sqlx::migrate!("../../migrations").run(&pool).await?;

    info!(target: "store", "database ready");
    Ok(pool)
}
