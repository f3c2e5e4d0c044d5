//! PostgreSQL connection pool and migration runner.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use shelf_kernel::{settings::DatabaseSettings, InitCtx, Module};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};

mod migrate;

pub use migrate::run_migrations;

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Translate settings into driver connect options.
pub fn connect_options(settings: &DatabaseSettings) -> PgConnectOptions {
    let options = PgConnectOptions::new()
        .host(&settings.host)
        .port(settings.port)
        .database(&settings.name)
        .username(&settings.user);

    if settings.password.is_empty() {
        options
    } else {
        options.password(&settings.password)
    }
}

/// Open the shared pool and verify the server is reachable.
pub async fn connect(settings: &DatabaseSettings) -> anyhow::Result<PgPool> {
    tracing::info!(
        target: "shelf-db",
        endpoint = %settings.endpoint(),
        max_connections = settings.max_connections,
        "connecting to postgres"
    );

    PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(connect_options(settings))
        .await
        .with_context(|| format!("failed to connect to postgres at {}", settings.endpoint()))
}

/// Core module owning the pool's lifecycle.
pub struct DatabaseModule {
    pool: PgPool,
}

impl DatabaseModule {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .context("database ping failed")?;
        tracing::info!(module = self.name(), "database reachable");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.pool.close().await;
        tracing::info!(module = self.name(), "connection pool closed");
        Ok(())
    }
}
