use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use url::Url;

use crate::models::NormalizedItem;
use crate::sources::{Envelope, SourceAdapter, decode_items, normalize_item};
use crate::utils::error::FetchError;

pub const SOURCE_ID: &str = "yahoo";

const DEFAULT_BASE: &str = "https://zenmarket.jp";

/// Yahoo Auctions listings via ZenMarket's search proxy. Same envelope shape
/// as the Mercari surface, different endpoint and product page.
pub struct YahooAdapter {
    client: Client,
    base: String,
}

impl YahooAdapter {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, DEFAULT_BASE)
    }

    pub fn with_base_url(client: Client, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
        }
    }

    fn auction_url(&self, item_code: &str) -> String {
        format!("{}/en/auction.aspx?itemCode={}", self.base, item_code)
    }
}

#[async_trait]
impl SourceAdapter for YahooAdapter {
    fn id(&self) -> &'static str {
        SOURCE_ID
    }

    async fn fetch(&self, query: &str) -> Result<Vec<NormalizedItem>, FetchError> {
        let endpoint = Url::parse_with_params(
            &format!("{}/en/yahoo.aspx/getProducts", self.base),
            &[("q", query), ("sort", "new"), ("order", "desc")],
        )
        .map_err(|e| FetchError::Payload(format!("invalid endpoint URL: {e}")))?;

        let envelope: Envelope = self
            .client
            .post(endpoint)
            .json(&serde_json::json!({ "page": 1 }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let items = decode_items(&envelope.d)?
            .iter()
            .filter_map(|raw| {
                let item = normalize_item(SOURCE_ID, raw, |code| self.auction_url(code));
                if item.is_none() {
                    debug!(source = SOURCE_ID, "skipping listing without item code");
                }
                item
            })
            .collect();

        Ok(items)
    }
}
