use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::AUTHORIZATION;
use serde_json::json;

use crate::models::NormalizedItem;
use crate::notify::Notifier;
use crate::sources;
use crate::utils::error::DeliveryError;

const DEFAULT_API_BASE: &str = "https://discord.com/api/v10";

/// Sends one embed per new listing through the Discord REST API.
pub struct DiscordNotifier {
    client: Client,
    token: String,
    api_base: String,
}

impl DiscordNotifier {
    pub fn new(client: Client, token: impl Into<String>) -> Self {
        Self::with_api_base(client, token, DEFAULT_API_BASE)
    }

    pub fn with_api_base(
        client: Client,
        token: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token: token.into(),
            api_base: api_base.into(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn deliver(&self, channel_id: &str, item: &NormalizedItem) -> Result<(), DeliveryError> {
        let payload = json!({ "embeds": [build_embed(item)] });

        let response = self
            .client
            .post(format!(
                "{}/channels/{}/messages",
                self.api_base, channel_id
            ))
            .header(AUTHORIZATION, format!("Bot {}", self.token))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(DeliveryError::Status(response.status()));
        }

        Ok(())
    }
}

fn accent_color(source_id: &str) -> u32 {
    match source_id {
        sources::mercari::SOURCE_ID => 0x09B1BA,
        sources::yahoo::SOURCE_ID => 0xFF0033,
        _ => 0x5865F2,
    }
}

fn source_label(source_id: &str) -> String {
    let mut chars = source_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

/// Embed layout carried over from the original bot: title, listing URL,
/// preview image and price when present, source + item code in the footer.
pub fn build_embed(item: &NormalizedItem) -> serde_json::Value {
    let mut embed = json!({
        "title": item.title,
        "url": item.url,
        "color": accent_color(&item.source_id),
        "footer": {
            "text": format!("Source: {} #{}", source_label(&item.source_id), item.item_id),
        },
    });

    if let Some(image_url) = &item.image_url {
        embed["image"] = json!({ "url": image_url });
    }

    if let Some(price) = &item.price {
        embed["fields"] = json!([{
            "name": "Price",
            "value": format!("{} {}", price.amount, price.currency),
            "inline": true,
        }]);
    }

    embed
}
