//! Database layer for MovieReview
//!
//! Provides:
//! - SeaORM entity models
//! - The `MovieStore` abstraction with SQL and in-memory implementations
//! - Connection pool management and schema bootstrap

pub mod models;
mod memory_store;
mod repository;
mod store;

pub use memory_store::MemoryStore;
pub use repository::SqlStore;
pub use store::MovieStore;

use crate::config::DatabaseConfig;
use crate::errors::{AppError, Result};
use models::{CommentEntity, MovieEntity};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
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
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(false);

        let conn = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect to {}: {}", redact(&config.url), e)
            })?;

        info!(backend = ?conn.get_database_backend(), "Database connection established");

        Ok(Self { conn })
    }

    /// Private in-memory SQLite database on a single connection
    pub async fn in_memory() -> Result<Self> {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..DatabaseConfig::default()
        };
        Self::new(&config).await
    }

    pub fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Create the movies and comments tables when they are missing.
    ///
    /// This is bootstrap only; existing tables are never altered.
    pub async fn ensure_schema(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        let schema = Schema::new(backend);

        let mut movies = schema.create_table_from_entity(MovieEntity);
        movies.if_not_exists();
        self.conn.execute(backend.build(&movies)).await?;

        let mut comments = schema.create_table_from_entity(CommentEntity);
        comments.if_not_exists();
        self.conn.execute(backend.build(&comments)).await?;

        for mut index in schema.create_index_from_entity(CommentEntity) {
            index.if_not_exists();
            self.conn.execute(backend.build(&index)).await?;
        }

        info!("Database schema ready");
        Ok(())
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

/// Strip credentials from a connection string before logging it
fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}://***{}", &url[..scheme_end], &url[at..])
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_hides_credentials() {
        assert_eq!(
            redact("postgres://user:secret@db:5432/reviews"),
            "postgres://***@db:5432/reviews"
        );
        assert_eq!(redact("sqlite://moviereview.db?mode=rwc"), "sqlite://moviereview.db?mode=rwc");
    }

    #[tokio::test]
    async fn test_schema_bootstrap_is_idempotent() {
        let pool = DbPool::in_memory().await.unwrap();
        pool.ensure_schema().await.unwrap();
        pool.ensure_schema().await.unwrap();
        pool.ping().await.unwrap();
    }
}
