use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};

use crate::config::DatabaseConfig;
use crate::utils::error::StoreError;

pub mod dedup;
pub mod registry;

pub use dedup::DedupStore;
pub use registry::WatchRegistry;

/// Shared SQLite handle. Two logical tables are persisted: watch entries
/// (unique on owner+query) and announced records (unique on source+item).
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str(&config.url)?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(opts)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// In-memory database for tests. A single connection is required: each
    /// `sqlite::memory:` connection gets its own database.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn dedup(&self) -> DedupStore {
        DedupStore::new(self.pool.clone())
    }

    pub fn registry(&self) -> WatchRegistry {
        WatchRegistry::new(self.pool.clone())
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS watch_entries (
                id         TEXT NOT NULL PRIMARY KEY,
                owner_id   TEXT NOT NULL,
                channel_id TEXT NOT NULL,
                query      TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE (owner_id, query)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS announced_items (
                source_id    TEXT NOT NULL,
                item_id      TEXT NOT NULL,
                announced_at TEXT NOT NULL,
                PRIMARY KEY (source_id, item_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
