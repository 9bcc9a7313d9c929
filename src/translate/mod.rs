use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::utils::error::TranslationError;

/// Title enrichment seam. Pluggable and failure-tolerant: the scheduler
/// keeps the original text whenever translation fails.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str) -> Result<String, TranslationError>;
}

const DEFAULT_BASE: &str = "https://translate.googleapis.com";

/// Google's unauthenticated gtx endpoint, the same one the original bot's
/// translation library talks to.
pub struct GoogleTranslator {
    client: Client,
    base: String,
    source_lang: String,
    target_lang: String,
}

impl GoogleTranslator {
    pub fn new(client: Client, source_lang: impl Into<String>, target_lang: impl Into<String>) -> Self {
        Self::with_base_url(client, DEFAULT_BASE, source_lang, target_lang)
    }

    pub fn with_base_url(
        client: Client,
        base: impl Into<String>,
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base: base.into(),
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
        }
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Result<String, TranslationError> {
        let endpoint = Url::parse_with_params(
            &format!("{}/translate_a/single", self.base),
            &[
                ("client", "gtx"),
                ("sl", self.source_lang.as_str()),
                ("tl", self.target_lang.as_str()),
                ("dt", "t"),
                ("q", text),
            ],
        )
        .map_err(|_| TranslationError::Payload)?;

        let body: serde_json::Value = self
            .client
            .get(endpoint)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        collect_segments(&body).ok_or(TranslationError::Payload)
    }
}

/// The gtx response is a nested array; index 0 holds translation segments,
/// each with the translated text at index 0.
fn collect_segments(body: &serde_json::Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut translated = String::new();
    for segment in segments {
        translated.push_str(segment.get(0)?.as_str()?);
    }

    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}
