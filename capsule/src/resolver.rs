use crate::domain::{
    Character, CharacterName, DEFAULT_LIST_LIMIT, Resolution, WriteBack,
};
use crate::operation::CharacterOperations;
use crate::ports::{CharacterSource, CharacterStore};
use async_trait::async_trait;
use shared::{Error, Result};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-through resolver: local store first, upstream catalog on a miss,
/// with the fetched character written back for future lookups.
///
/// Holds no mutable state of its own. Concurrent resolves of the same name
/// are reconciled by the store's uniqueness constraint.
#[derive(Clone)]
pub struct Resolver {
    store: Arc<dyn CharacterStore>,
    source: Arc<dyn CharacterSource>,
}

impl Resolver {
    pub fn new(store: Arc<dyn CharacterStore>, source: Arc<dyn CharacterSource>) -> Self {
        Self { store, source }
    }

    /// First upstream match, renamed to its natural key
    async fn fetch_first(&self, name: &CharacterName) -> Result<Character> {
        let fetched = self.source.fetch_by_name(name).await?;
        let count = fetched.len();

        let first = fetched.into_iter().next().ok_or(Error::NotFoundRemote)?;
        debug!("Upstream returned {} match(es) for '{}'", count, name);

        first.normalized().map_err(|_| {
            Error::Upstream(format!("upstream returned a nameless record for '{}'", name))
        })
    }

    async fn write_back(&self, character: &Character) -> WriteBack {
        match self.store.insert(character).await {
            Ok(()) => {
                info!("Cached character '{}' (id {})", character.name, character.id);
                WriteBack::Stored
            }
            Err(Error::AlreadyExists(_)) => {
                debug!(
                    "Character '{}' was cached by a concurrent resolve",
                    character.name
                );
                WriteBack::AlreadyCached
            }
            Err(e) => {
                warn!(
                    "Failed to cache character '{}', serving it uncached: {}",
                    character.name, e
                );
                WriteBack::Failed
            }
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver").finish_non_exhaustive()
    }
}

#[async_trait]
impl CharacterOperations for Resolver {
    async fn resolve(&self, name: &str) -> Result<Resolution> {
        let name = CharacterName::parse(name)?;

        match self.store.find_by_name(&name).await {
            Ok(character) => return Ok(Resolution::local(character)),
            Err(Error::NotFoundLocal) => {
                debug!("Character '{}' not in local store, fetching upstream", name);
            }
            // A degraded store must not turn into upstream load
            Err(Error::Storage(msg)) => return Err(Error::Storage(msg)),
            Err(other) => return Err(Error::Storage(other.to_string())),
        }

        let character = self.fetch_first(&name).await?;
        let write_back = self.write_back(&character).await;

        Ok(Resolution::remote(character, write_back))
    }

    async fn list(&self, limit: Option<i64>) -> Result<Vec<Character>> {
        let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT);
        if limit <= 0 {
            return Err(Error::InvalidInput(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }

        self.store.list_ordered(limit).await
    }

    async fn delete(&self, name: &str) -> Result<()> {
        let name = CharacterName::parse(name)?;

        match self.store.delete_by_name(&name).await? {
            0 => Err(Error::NotDeleted(name.into_inner())),
            _ => {
                info!("Deleted character '{}'", name);
                Ok(())
            }
        }
    }

    async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
