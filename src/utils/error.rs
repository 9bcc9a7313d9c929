use std::time::Duration;

use thiserror::Error;

/// Failures from a single source adapter call. Recovered locally by the
/// scheduler: the source is skipped for this cycle, siblings are unaffected.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unexpected upstream payload: {0}")]
    Payload(String),
}

/// Persistence failures. Fatal to the affected item for this cycle only;
/// the item stays unmarked and is retried on the next pass.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Watch registry errors. Duplicate/NotFound are user-facing validation
/// outcomes, surfaced as command replies rather than logged as failures.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("alert for \"{query}\" already exists")]
    Duplicate { query: String },

    #[error("alert for \"{query}\" does not exist")]
    NotFound { query: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Transport failures while delivering a notification. The item is already
/// marked announced at this point, so the loss is logged, not retried.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("delivery endpoint returned status {0}")]
    Status(reqwest::StatusCode),
}

/// Translation failures. Never fatal: the scheduler falls back to the
/// original title.
#[derive(Debug, Error)]
pub enum TranslationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response shape from translation endpoint")]
    Payload,
}
