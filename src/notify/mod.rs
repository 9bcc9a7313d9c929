use async_trait::async_trait;

use crate::models::NormalizedItem;
use crate::utils::error::DeliveryError;

pub mod discord;

pub use discord::DiscordNotifier;

/// Delivery seam between the scheduler and the chat platform. Ordering
/// across items within one cycle is not guaranteed and not required.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Format and send one item to a transport-level target (here, a
    /// channel id). Missing optional fields are formatted gracefully,
    /// never a failure.
    async fn deliver(&self, channel_id: &str, item: &NormalizedItem) -> Result<(), DeliveryError>;
}
