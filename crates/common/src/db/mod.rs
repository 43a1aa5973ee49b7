//! Database layer for the WOF catalog
//!
//! Provides:
//! - SeaORM entity models
//! - Schema migrations
//! - Repository with the catalog operations
//! - Connection pool management

pub mod migration;
pub mod models;
mod repository;

pub use repository::{
    CommentNode, CommentThread, FrameworkRanking, LanguageRanking, NewUser, Repository,
    VersionContributions,
};

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use migration::Migrator;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts.max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e),
            })?;

        let pool = Self { conn };

        if config.run_migrations {
            pool.migrate().await?;
        }

        info!("Database connection established");

        Ok(pool)
    }

    /// Wrap an existing connection
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    /// Apply pending migrations
    pub async fn migrate(&self) -> Result<()> {
        Migrator::up(&self.conn, None)
            .await
            .map_err(|e| AppError::Migration {
                message: e.to_string(),
            })?;
        info!("Database schema up to date");
        Ok(())
    }

    /// Connection for lock-free reads
    pub fn read(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Connection for writes and transactions
    pub fn write(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Migrated SQLite database in a temporary directory
    pub async fn test_pool() -> (DbPool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("wof-test.db");

        let config = DatabaseConfig {
            url: format!("sqlite:{}?mode=rwc", db_path.display()),
            max_connections: 1,
            min_connections: 1,
            connect_timeout_secs: 5,
            idle_timeout_secs: 60,
            run_migrations: true,
        };

        let pool = DbPool::new(&config).await.unwrap();
        (pool, temp_dir)
    }

    /// Repository over a fresh database
    pub async fn test_repo() -> (Repository, TempDir) {
        let (pool, dir) = test_pool().await;
        (Repository::new(pool), dir)
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::test_pool;

    #[tokio::test]
    async fn test_ping_after_migration() {
        let (pool, _dir) = test_pool().await;
        pool.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_migration_is_idempotent() {
        let (pool, _dir) = test_pool().await;
        pool.migrate().await.unwrap();
    }
}
