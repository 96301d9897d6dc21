//! # finbot-memory
//!
//! SQLite-backed audit log. Every processed inbound message is recorded
//! with its outcome so failures that are collapsed into canned user
//! messages remain diagnosable.

pub mod audit;

pub use audit::{AuditEntry, AuditLogger, AuditStatus};

use finbot_core::error::BotError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    pub async fn new(db_path: &str) -> Result<Self, BotError> {
        // Ensure parent directory exists.
        if let Some(parent) = std::path::Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| BotError::Audit(format!("failed to create data dir: {e}")))?;
            }
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
            .map_err(|e| BotError::Audit(format!("invalid db path: {e}")))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

        // In-memory databases are per-connection; cap the pool at one
        // so every handle sees the same data.
        let max_connections = if db_path == ":memory:" { 1 } else { 4 };

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(max_connections)
            .connect_with(opts)
            .await
            .map_err(|e| BotError::Audit(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("audit store initialized at {db_path}");

        Ok(Self { pool })
    }

    async fn run_migrations(pool: &SqlitePool) -> Result<(), BotError> {
        sqlx::raw_sql(include_str!("../migrations/001_audit_log.sql"))
            .execute(pool)
            .await
            .map_err(|e| BotError::Audit(format!("migration failed: {e}")))?;
        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_store_in_memory_runs_migrations() {
        let store = Store::new(":memory:").await.unwrap();
        // The audit table exists and is empty.
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM audit_log")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
