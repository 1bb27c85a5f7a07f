//! SQLite-backed store.
//!
//! Split into focused submodules:
//! - `users`: Telegram chat links and Google OAuth tokens
//! - `categories`: per-user spending categories
//! - `transactions`: the confirmed ledger
//! - `runs`: workflow run log and the "already processed" check

mod categories;
mod runs;
mod transactions;
mod users;

pub use runs::{RunStatus, WorkflowRun};
pub use transactions::TransactionRecord;

use mony_core::{config::MemoryConfig, error::MonyError, shellexpand};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tracing::info;

const IN_MEMORY: &str = ":memory:";

/// Persistent store backed by SQLite.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Create a new store, running migrations on first use.
    ///
    /// `:memory:` opens a private in-memory database on a single connection.
    pub async fn new(config: &MemoryConfig) -> Result<Self, MonyError> {
        let (opts, max_connections) = if config.db_path == IN_MEMORY {
            let opts = SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| MonyError::Memory(format!("invalid db path: {e}")))?;
            (opts, 1)
        } else {
            let db_path = shellexpand(&config.db_path);

            // Ensure parent directory exists.
            if let Some(parent) = std::path::Path::new(&db_path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| MonyError::Memory(format!("failed to create data dir: {e}")))?;
            }

            let opts = SqliteConnectOptions::from_str(&format!("sqlite:{db_path}"))
                .map_err(|e| MonyError::Memory(format!("invalid db path: {e}")))?
                .create_if_missing(true)
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);
            (opts, 4)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(opts.foreign_keys(true))
            .await
            .map_err(|e| MonyError::Memory(format!("failed to connect to sqlite: {e}")))?;

        Self::run_migrations(&pool).await?;

        info!("store initialized at {}", config.db_path);

        Ok(Self { pool })
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Run SQL migrations, tracking which have already been applied.
    async fn run_migrations(pool: &SqlitePool) -> Result<(), MonyError> {
        sqlx::raw_sql(
            "CREATE TABLE IF NOT EXISTS _migrations (
                name TEXT PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )
        .execute(pool)
        .await
        .map_err(|e| MonyError::Memory(format!("failed to create migrations table: {e}")))?;

        let migrations: &[(&str, &str)] =
            &[("001_init", include_str!("../../migrations/001_init.sql"))];

        for (name, sql) in migrations {
            let applied: Option<(String,)> =
                sqlx::query_as("SELECT name FROM _migrations WHERE name = ?")
                    .bind(name)
                    .fetch_optional(pool)
                    .await
                    .map_err(|e| {
                        MonyError::Memory(format!("failed to check migration {name}: {e}"))
                    })?;

            if applied.is_some() {
                continue;
            }

            sqlx::raw_sql(sql)
                .execute(pool)
                .await
                .map_err(|e| MonyError::Memory(format!("migration {name} failed: {e}")))?;

            sqlx::query("INSERT INTO _migrations (name) VALUES (?)")
                .bind(name)
                .execute(pool)
                .await
                .map_err(|e| {
                    MonyError::Memory(format!("failed to record migration {name}: {e}"))
                })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests;
