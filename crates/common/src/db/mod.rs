//! Database layer for the biobank registry
//!
//! Provides:
//! - SeaORM entity models
//! - Repository for list, lookup and insert operations
//! - Report routine invocation
//! - Connection pool management

pub mod models;
pub mod reports;
mod repository;

pub use reports::{Report, ReportTable};
pub use repository::Repository;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    conn: Arc<DatabaseConnection>,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!(
            host = %config.host,
            database = %config.name,
            max_connections = config.max_connections,
            "Connecting to database..."
        );

        let mut opts = ConnectOptions::new(config.connection_url());
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections.min(config.max_connections))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        info!("Database connection established");

        Ok(Self { conn: Arc::new(conn) })
    }

    /// Wrap an existing connection (used with `MockDatabase` in tests)
    pub fn from_connection(conn: DatabaseConnection) -> Self {
        Self::from_shared(Arc::new(conn))
    }

    /// Share a connection the caller keeps a handle to. A mock connection's
    /// transaction log is only reachable once every pool clone is dropped.
    pub fn from_shared(conn: Arc<DatabaseConnection>) -> Self {
        Self { conn }
    }

    /// Get the underlying connection
    pub fn conn(&self) -> &DatabaseConnection {
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
