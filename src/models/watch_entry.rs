use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::models::generate_id;

/// A standing request to be notified of new listings matching a query.
/// Unique on `(owner_id, query)`; owned by the watch registry and read-only
/// to the poll scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct WatchEntry {
    pub id: String,
    /// Chat-platform user who registered the alert.
    pub owner_id: String,
    /// Delivery target: the channel the alert was registered from.
    pub channel_id: String,
    /// The marketplace search query, verbatim.
    pub query: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewWatchEntry {
    pub owner_id: String,
    pub channel_id: String,
    pub query: String,
}

impl WatchEntry {
    pub fn new(new_entry: NewWatchEntry) -> Self {
        Self {
            id: generate_id(),
            owner_id: new_entry.owner_id,
            channel_id: new_entry.channel_id,
            query: new_entry.query,
            created_at: Utc::now(),
        }
    }
}
