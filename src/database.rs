//! Database connection, one per configured engine.
use std::str::FromStr;
use std::sync::Arc;

use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::{Database as DatabaseConfig, Engine};
use crate::user::{MemoryUserStore, MySqlUserStore, PgUserStore, SqliteUserStore, UserStore};

#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error(transparent)]
    Sql(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Connect to the configured engine, run migrations and return its store.
pub async fn connect(
    config: &DatabaseConfig,
) -> Result<Arc<dyn UserStore>, DatabaseError> {
    match config.engine {
        Engine::Postgres => {
            let options = PgConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.username)
                .password(&config.password)
                .database(&config.name)
                .ssl_mode(PgSslMode::from_str(&config.ssl_mode)?);
            let pool = PgPoolOptions::new()
                .max_connections(config.pool_size)
                .connect_with(options)
                .await?;

            sqlx::migrate!("./migrations/postgres").run(&pool).await?;
            tracing::info!(host = %config.host, db = %config.name, "postgres connected");

            Ok(Arc::new(PgUserStore::new(pool)))
        },
        Engine::Mysql => {
            let options = MySqlConnectOptions::new()
                .host(&config.host)
                .port(config.port)
                .username(&config.username)
                .password(&config.password)
                .database(&config.name)
                .charset("utf8mb4");
            let pool = MySqlPoolOptions::new()
                .max_connections(config.pool_size)
                .connect_with(options)
                .await?;

            sqlx::migrate!("./migrations/mysql").run(&pool).await?;
            tracing::info!(host = %config.host, db = %config.name, "mysql connected");

            Ok(Arc::new(MySqlUserStore::new(pool)))
        },
        Engine::Sqlite => {
            let filename = format!("{}.db", config.name);
            let options = SqliteConnectOptions::new()
                .filename(&filename)
                .create_if_missing(true);
            let pool = SqlitePoolOptions::new()
                .max_connections(config.pool_size)
                .connect_with(options)
                .await?;

            sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
            tracing::info!(%filename, "sqlite connected");

            Ok(Arc::new(SqliteUserStore::new(pool)))
        },
        Engine::Memory => {
            tracing::warn!("using in-memory store, data will not survive a restart");
            Ok(Arc::new(MemoryUserStore::new()))
        },
    }
}
