use capsule::{CharacterOperations, Resolver};
use shared::config::Config;
use std::sync::Arc;

/// Server state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub operations: Arc<dyn CharacterOperations>,
}

impl AppState {
    pub fn new(operations: Arc<dyn CharacterOperations>) -> Self {
        Self { operations }
    }

    /// Wires the configured store and upstream source into a resolver
    pub async fn from_config(config: &Config) -> shared::Result<Self> {
        let store = gateway::store_from_config(config).await?;
        let source = gateway::source_from_config(config)?;

        Ok(Self::new(Arc::new(Resolver::new(store, source))))
    }
}
