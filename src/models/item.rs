use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A listing as normalized by a source adapter. Ephemeral: produced per poll
/// cycle and never persisted as its own record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NormalizedItem {
    /// Identifier of the adapter that produced this item.
    pub source_id: String,
    /// The marketplace's canonical listing identifier, unique within a
    /// source. Never the query string.
    pub item_id: String,
    pub title: String,
    pub url: String,
    pub image_url: Option<String>,
    pub price: Option<Price>,
    /// Source-specific payload, kept for diagnostics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Price {
    /// Upstream amount, passed through verbatim.
    pub amount: String,
    pub currency: String,
}

impl Price {
    pub fn jpy(amount: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            currency: "JPY".to_string(),
        }
    }
}

/// Persisted marker that an item has been announced. At most one record per
/// `(source_id, item_id)`; never updated, never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct AnnouncedRecord {
    pub source_id: String,
    pub item_id: String,
    pub announced_at: DateTime<Utc>,
}
