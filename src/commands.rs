use crate::models::NewWatchEntry;
use crate::store::WatchRegistry;
use crate::utils::error::{RegistryError, StoreError};

/// Thin command front-end over the watch registry, exposed to the chat
/// platform collaborator. Validation outcomes (duplicate, missing) become
/// direct replies; only persistence failures propagate to the transport.
#[derive(Clone)]
pub struct CommandHandler {
    registry: WatchRegistry,
}

impl CommandHandler {
    pub fn new(registry: WatchRegistry) -> Self {
        Self { registry }
    }

    pub async fn register(
        &self,
        owner_id: &str,
        channel_id: &str,
        query: &str,
    ) -> Result<String, StoreError> {
        let result = self
            .registry
            .create(NewWatchEntry {
                owner_id: owner_id.to_string(),
                channel_id: channel_id.to_string(),
                query: query.to_string(),
            })
            .await;

        match result {
            Ok(entry) => Ok(format!("Registered alert for **{}**!", entry.query)),
            Err(err) => validation_reply(err),
        }
    }

    pub async fn unregister(&self, owner_id: &str, query: &str) -> Result<String, StoreError> {
        match self.registry.delete(owner_id, query).await {
            Ok(()) => Ok(format!("Unregistered alert for **{query}**!")),
            Err(err) => validation_reply(err),
        }
    }

    pub async fn list_alerts(&self, owner_id: &str) -> Result<String, StoreError> {
        let entries = self.registry.list_for_owner(owner_id).await?;

        if entries.is_empty() {
            return Ok("You have no alerts!".to_string());
        }

        Ok(entries
            .iter()
            .map(|entry| entry.query.as_str())
            .collect::<Vec<_>>()
            .join("\n"))
    }
}

/// Registry validation outcomes become direct replies; only persistence
/// failures propagate.
fn validation_reply(err: RegistryError) -> Result<String, StoreError> {
    match err {
        RegistryError::Duplicate { query } => Ok(format!("Alert for **{query}** already exists!")),
        RegistryError::NotFound { query } => Ok(format!("Alert for **{query}** does not exist!")),
        RegistryError::Store(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Database;

    async fn handler() -> CommandHandler {
        CommandHandler::new(Database::connect_in_memory().await.unwrap().registry())
    }

    #[tokio::test]
    async fn test_register_and_duplicate_reply() {
        let commands = handler().await;

        let reply = commands.register("U1", "chan-1", "figure A").await.unwrap();
        assert_eq!(reply, "Registered alert for **figure A**!");

        let reply = commands.register("U1", "chan-1", "figure A").await.unwrap();
        assert_eq!(reply, "Alert for **figure A** already exists!");
    }

    #[tokio::test]
    async fn test_unregister_replies() {
        let commands = handler().await;

        let reply = commands.unregister("U1", "figure A").await.unwrap();
        assert_eq!(reply, "Alert for **figure A** does not exist!");

        commands.register("U1", "chan-1", "figure A").await.unwrap();
        let reply = commands.unregister("U1", "figure A").await.unwrap();
        assert_eq!(reply, "Unregistered alert for **figure A**!");
    }

    #[tokio::test]
    async fn test_list_alerts() {
        let commands = handler().await;

        assert_eq!(commands.list_alerts("U1").await.unwrap(), "You have no alerts!");

        commands.register("U1", "chan-1", "figure A").await.unwrap();
        commands.register("U1", "chan-1", "figure B").await.unwrap();
        commands.register("U2", "chan-2", "figure C").await.unwrap();

        assert_eq!(commands.list_alerts("U1").await.unwrap(), "figure A\nfigure B");
    }
}
