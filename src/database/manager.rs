use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, Transaction};
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Errors from the database handle
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Data-access handle shared by request handlers. Cloning is cheap; every
/// clone refers to the same connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect eagerly, failing if the server is unreachable.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect(Self::url(config)?).await?;
        info!("Connected database pool (max {} connections)", config.max_connections);
        Ok(Self { pool })
    }

    /// Build the pool without opening a connection. Connections are made on
    /// first use, so the API can start (and report degraded health) while the
    /// database is down.
    pub fn connect_lazy(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let pool = Self::pool_options(config).connect_lazy(Self::url(config)?)?;
        Ok(Self { pool })
    }

    fn url(config: &DatabaseConfig) -> Result<&str, DatabaseError> {
        if config.url.is_empty() {
            return Err(DatabaseError::ConfigMissing("DATABASE_URL"));
        }
        Ok(&config.url)
    }

    fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Acquire a dedicated connection wrapped in a transaction. Dropping the
    /// transaction without committing rolls it back.
    pub async fn begin(&self) -> Result<Transaction<'static, Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Apply the embedded schema migrations.
    pub async fn migrate(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
        info!("Closed database pool");
    }
}

/// Roll back explicitly so the failure is visible in the logs before the
/// caller reports its own error.
pub async fn rollback(tx: Transaction<'static, Postgres>, operation: &str) {
    if let Err(e) = tx.rollback().await {
        warn!("Rollback of {} failed: {}", operation, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn lazy_pool_does_not_touch_the_network() {
        let mut config = AppConfig::development().database;
        config.url = "postgres://nobody@127.0.0.1:1/ems_unreachable".to_string();
        assert!(Database::connect_lazy(&config).is_ok());
    }

    #[test]
    fn empty_url_is_a_configuration_error() {
        let mut config = AppConfig::development().database;
        config.url.clear();
        assert!(matches!(
            Database::connect_lazy(&config),
            Err(DatabaseError::ConfigMissing("DATABASE_URL"))
        ));
    }
}
