pub mod youtrack;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::config::AppConfig;
use crate::model::entity::{EntityKey, RemoteEntity};

#[async_trait]
pub trait Tracker: Send + Sync {
    fn name(&self) -> &str;
    /// Fetch one entity. Returns Ok(None) when the server has no entity
    /// with this key.
    async fn get_entity(&self, key: &EntityKey) -> Result<Option<RemoteEntity>>;
    /// Push a new body, and optionally a new summary, to the server.
    /// Returns the entity as the server now stores it.
    async fn update_entity(
        &self,
        key: &EntityKey,
        body: &str,
        summary: Option<&str>,
    ) -> Result<RemoteEntity>;
}

pub fn create_tracker(config: &AppConfig) -> Option<Arc<dyn Tracker>> {
    config.youtrack.as_ref().map(|cfg| {
        Arc::new(youtrack::YouTrackClient::new(
            cfg.base_url.clone(),
            cfg.token.clone(),
        )) as Arc<dyn Tracker>
    })
}
