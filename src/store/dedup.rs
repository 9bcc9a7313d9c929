use chrono::Utc;
use sqlx::SqlitePool;

use crate::models::AnnouncedRecord;
use crate::utils::error::StoreError;

/// The dedup gate: a persisted set of `(source_id, item_id)` pairs that have
/// already been announced. The insert is the single source of truth for
/// "first sighting"; callers never do a separate read-then-write.
#[derive(Clone)]
pub struct DedupStore {
    pool: SqlitePool,
}

impl DedupStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Pure lookup, no side effect.
    pub async fn is_announced(&self, source_id: &str, item_id: &str) -> Result<bool, StoreError> {
        let row: Option<(i64,)> = sqlx::query_as(
            "SELECT 1 FROM announced_items WHERE source_id = ? AND item_id = ?",
        )
        .bind(source_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.is_some())
    }

    /// Atomic insert-if-absent. Returns `true` exactly once per key; repeat
    /// calls succeed idempotently and return `false`. Safe under concurrent
    /// invocation with the same key: the primary key arbitrates the race.
    pub async fn mark_announced(&self, source_id: &str, item_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO announced_items (source_id, item_id, announced_at) \
             VALUES (?, ?, ?)",
        )
        .bind(source_id)
        .bind(item_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Full record for an announced item, if any. Diagnostic lookup; the
    /// polling path only needs `is_announced`/`mark_announced`.
    pub async fn record(
        &self,
        source_id: &str,
        item_id: &str,
    ) -> Result<Option<AnnouncedRecord>, StoreError> {
        let record = sqlx::query_as::<_, AnnouncedRecord>(
            "SELECT source_id, item_id, announced_at \
             FROM announced_items WHERE source_id = ? AND item_id = ?",
        )
        .bind(source_id)
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
