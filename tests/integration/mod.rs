// Integration tests for zenwatch
// These tests verify that all components work together correctly

pub mod command_tests;
pub mod scheduler_tests;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use zenwatch::models::{NewWatchEntry, NormalizedItem};
use zenwatch::notify::Notifier;
use zenwatch::scheduler::{PollScheduler, PollSettings};
use zenwatch::sources::SourceAdapter;
use zenwatch::store::Database;
use zenwatch::utils::error::{DeliveryError, FetchError};

/// Adapter whose behavior is scripted per query.
pub struct QueryAdapter {
    id: &'static str,
    respond: Box<dyn Fn(&str) -> Result<Vec<NormalizedItem>, FetchError> + Send + Sync>,
}

impl QueryAdapter {
    pub fn new(
        id: &'static str,
        respond: impl Fn(&str) -> Result<Vec<NormalizedItem>, FetchError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            id,
            respond: Box::new(respond),
        })
    }
}

#[async_trait]
impl SourceAdapter for QueryAdapter {
    fn id(&self) -> &'static str {
        self.id
    }

    async fn fetch(&self, query: &str) -> Result<Vec<NormalizedItem>, FetchError> {
        (self.respond)(query)
    }
}

/// Notifier that records deliveries instead of talking to a transport.
#[derive(Default)]
pub struct RecordingNotifier {
    deliveries: Mutex<Vec<(String, String, String)>>, // (channel, item, title)
}

impl RecordingNotifier {
    pub fn recorded(&self) -> Vec<(String, String, String)> {
        self.deliveries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, channel_id: &str, item: &NormalizedItem) -> Result<(), DeliveryError> {
        self.deliveries.lock().unwrap().push((
            channel_id.to_string(),
            item.item_id.clone(),
            item.title.clone(),
        ));
        Ok(())
    }
}

pub fn listing(source: &str, item_id: &str, title: &str) -> NormalizedItem {
    NormalizedItem {
        source_id: source.to_string(),
        item_id: item_id.to_string(),
        title: title.to_string(),
        url: format!("https://zenmarket.jp/en/product.aspx?itemCode={item_id}"),
        image_url: None,
        price: None,
        raw: None,
    }
}

pub fn test_settings() -> PollSettings {
    PollSettings {
        check_interval: Duration::from_secs(60),
        fetch_timeout: Duration::from_secs(2),
        max_concurrent_fetches: 4,
    }
}

pub async fn test_database() -> Database {
    Database::connect_in_memory()
        .await
        .expect("in-memory database")
}

pub async fn register(db: &Database, owner: &str, channel: &str, query: &str) {
    db.registry()
        .create(NewWatchEntry {
            owner_id: owner.to_string(),
            channel_id: channel.to_string(),
            query: query.to_string(),
        })
        .await
        .expect("watch entry");
}

pub fn scheduler_over(
    db: &Database,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    notifier: Arc<RecordingNotifier>,
) -> PollScheduler {
    PollScheduler::new(
        db.registry(),
        db.dedup(),
        adapters,
        notifier,
        None,
        test_settings(),
    )
}
