use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

use crate::models::{NormalizedItem, Price};
use crate::utils::error::FetchError;

pub mod mercari;
pub mod yahoo;

pub use mercari::MercariAdapter;
pub use yahoo::YahooAdapter;

/// Source identifiers accepted in `sources.enabled`.
pub const KNOWN_SOURCES: &[&str] = &[mercari::SOURCE_ID, yahoo::SOURCE_ID];

/// A pluggable marketplace source. Stateless and side-effect-free apart from
/// the network call; fetching the same query twice with no new listings
/// returns the same items.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Stable identifier, used as the dedup key prefix.
    fn id(&self) -> &'static str;

    /// Fetch candidate listings for a query. An empty list is a valid and
    /// common result. Malformed individual listings are skipped, never
    /// fatal to the whole call.
    async fn fetch(&self, query: &str) -> Result<Vec<NormalizedItem>, FetchError>;
}

/// ZenMarket wraps its JSON in an ASP.NET envelope: `{"d": "<json string>"}`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub d: String,
}

/// Decode the inner document of a ZenMarket envelope into raw listing
/// values. A missing `Items` array is treated as an empty result; anything
/// that is not JSON at all is a payload failure.
pub(crate) fn decode_items(inner: &str) -> Result<Vec<serde_json::Value>, FetchError> {
    let document: serde_json::Value = serde_json::from_str(inner)
        .map_err(|e| FetchError::Payload(format!("inner document is not JSON: {e}")))?;

    let items = match document.get("Items").and_then(|v| v.as_array()) {
        Some(items) => items.clone(),
        None => {
            debug!("envelope without an Items array, treating as empty");
            Vec::new()
        }
    };

    Ok(items)
}

/// Normalize one raw ZenMarket listing. Returns `None` when the listing has
/// no usable item code; the caller skips it and keeps the rest of the list.
pub(crate) fn normalize_item(
    source_id: &'static str,
    raw: &serde_json::Value,
    product_url: impl FnOnce(&str) -> String,
) -> Option<NormalizedItem> {
    let item_code = raw
        .get("ItemCode")
        .and_then(|v| v.as_str())
        .filter(|code| !code.is_empty())?;

    let title = raw
        .get("ClearTitle")
        .and_then(|v| v.as_str())
        .filter(|title| !title.is_empty())
        .unwrap_or("Unknown")
        .to_string();

    let image_url = raw
        .get("PreviewImageUrl")
        .and_then(|v| v.as_str())
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let price = raw
        .get("PriceTextControl")
        .and_then(|v| v.as_str())
        .and_then(parse_price_control);

    Some(NormalizedItem {
        source_id: source_id.to_string(),
        item_id: item_code.to_string(),
        url: product_url(item_code),
        title,
        image_url,
        price,
        raw: Some(raw.clone()),
    })
}

/// The listing price arrives as an HTML fragment; the JPY amount is the
/// `data-jpy` attribute of its first span. Any parse failure means "no
/// price", never an error.
pub(crate) fn parse_price_control(fragment: &str) -> Option<Price> {
    let html = Html::parse_fragment(fragment);
    let selector = Selector::parse("span[data-jpy]").ok()?;
    let amount = html
        .select(&selector)
        .next()?
        .value()
        .attr("data-jpy")?
        .trim();

    if amount.is_empty() {
        None
    } else {
        Some(Price::jpy(amount))
    }
}
