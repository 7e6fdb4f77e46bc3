//! Database module providing connection management, migrations, and queries.

pub mod pipeline_builds;
pub mod test_results;

use std::time::Duration;

use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use crate::config::{Config, DatabaseSettings};
use crate::error::{AppError, AppResult};
use crate::migration::Migrator;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration.
    pub async fn new(config: &Config) -> AppResult<Self> {
        Self::connect(&config.database).await
    }

    /// Connect with explicit database settings.
    pub async fn connect(settings: &DatabaseSettings) -> AppResult<Self> {
        let mut options = ConnectOptions::new(settings.url.clone());
        options
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .connect_timeout(Duration::from_secs(settings.connect_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to database: {}", e)))?;

        info!(
            "Database pool ready (max_connections={}, min_connections={})",
            settings.max_connections, settings.min_connections
        );

        Ok(DbPool { conn })
    }

    /// Apply pending schema migrations.
    pub async fn run_migrations(&self) -> AppResult<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Database(format!("Failed to run migrations: {}", e)))
    }

    /// Get access to the connection for executing queries.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.conn
    }
}
