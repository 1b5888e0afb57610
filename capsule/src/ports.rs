use crate::domain::{Character, CharacterName};
use async_trait::async_trait;
use shared::Result;

// Ports are the pluggable edges of the resolver: where characters are kept
// locally and where they come from on a miss.

/// Local storage for resolved characters
#[async_trait]
pub trait CharacterStore: Send + Sync + 'static {
    /// `Error::NotFoundLocal` when no row matches
    async fn find_by_name(&self, name: &CharacterName) -> Result<Character>;

    /// Insert-if-absent; an existing name or id yields `Error::AlreadyExists`
    async fn insert(&self, character: &Character) -> Result<()>;

    /// At most `limit` characters, ascending by id
    async fn list_ordered(&self, limit: i64) -> Result<Vec<Character>>;

    /// Number of rows removed
    async fn delete_by_name(&self, name: &CharacterName) -> Result<u64>;

    async fn ping(&self) -> Result<()>;
}

/// The authoritative catalog characters are fetched from on a local miss.
///
/// Reports exactly what the catalog returned; an empty vector is not an error.
#[async_trait]
pub trait CharacterSource: Send + Sync + 'static {
    async fn fetch_by_name(&self, name: &CharacterName) -> Result<Vec<Character>>;
}
