use sqlx::SqlitePool;

use crate::models::{NewWatchEntry, WatchEntry};
use crate::utils::error::{RegistryError, StoreError};

/// CRUD over the persisted watch list. Uniqueness of `(owner_id, query)` is
/// enforced by the table constraint, not a pre-read.
#[derive(Clone)]
pub struct WatchRegistry {
    pool: SqlitePool,
}

impl WatchRegistry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, new_entry: NewWatchEntry) -> Result<WatchEntry, RegistryError> {
        let entry = WatchEntry::new(new_entry);

        let result = sqlx::query(
            "INSERT INTO watch_entries (id, owner_id, channel_id, query, created_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.owner_id)
        .bind(&entry.channel_id)
        .bind(&entry.query)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(entry),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(RegistryError::Duplicate { query: entry.query })
            }
            Err(e) => Err(StoreError::from(e).into()),
        }
    }

    pub async fn delete(&self, owner_id: &str, query: &str) -> Result<(), RegistryError> {
        let result = sqlx::query("DELETE FROM watch_entries WHERE owner_id = ? AND query = ?")
            .bind(owner_id)
            .bind(query)
            .execute(&self.pool)
            .await
            .map_err(StoreError::from)?;

        if result.rows_affected() == 0 {
            return Err(RegistryError::NotFound {
                query: query.to_string(),
            });
        }

        Ok(())
    }

    /// Snapshot of all entries, consumed once per poll cycle. Not required
    /// to be transactionally consistent with concurrent command writes.
    pub async fn list_all(&self) -> Result<Vec<WatchEntry>, StoreError> {
        let entries = sqlx::query_as::<_, WatchEntry>(
            "SELECT id, owner_id, channel_id, query, created_at \
             FROM watch_entries ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<WatchEntry>, StoreError> {
        let entries = sqlx::query_as::<_, WatchEntry>(
            "SELECT id, owner_id, channel_id, query, created_at \
             FROM watch_entries WHERE owner_id = ? ORDER BY created_at",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}
