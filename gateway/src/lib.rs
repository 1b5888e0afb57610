pub mod memory_store;
pub mod remote;
pub mod sql_store;

pub use memory_store::MemoryCharacterStore;
pub use remote::HttpCharacterSource;
pub use sql_store::SqlCharacterStore;

use capsule::{CharacterSource, CharacterStore};
use shared::config::{Config, StoreKind};
use shared::{Error, Result};
use std::sync::Arc;
use tracing::info;

/// Builds the configured store; SQL stores are migrated before use
pub async fn store_from_config(config: &Config) -> Result<Arc<dyn CharacterStore>> {
    match config.store {
        StoreKind::Memory => {
            info!("Using in-memory character store");
            Ok(Arc::new(MemoryCharacterStore::new()))
        }
        StoreKind::Sql => {
            let url = config.database_url.as_deref().ok_or_else(|| {
                Error::Config("CAPSULE_DATABASE_URL is not set".to_string())
            })?;

            let store =
                SqlCharacterStore::connect(url, config.db_max_connections, config.timeout).await?;
            store.migrate().await?;

            info!(
                "Using SQL character store (max {} connections)",
                config.db_max_connections
            );
            Ok(Arc::new(store))
        }
    }
}

pub fn source_from_config(config: &Config) -> Result<Arc<dyn CharacterSource>> {
    info!("Fetching missing characters from {}", config.upstream_url);
    Ok(Arc::new(HttpCharacterSource::new(
        config.upstream_url.clone(),
        config.timeout,
    )?))
}
