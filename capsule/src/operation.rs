use crate::domain::{Character, Resolution};
use async_trait::async_trait;
use shared::Result;

/// Operations exposed to the HTTP layer
#[async_trait]
pub trait CharacterOperations: Send + Sync + 'static {
    async fn resolve(&self, name: &str) -> Result<Resolution>;

    async fn list(&self, limit: Option<i64>) -> Result<Vec<Character>>;

    async fn delete(&self, name: &str) -> Result<()>;

    async fn ping(&self) -> Result<()>;
}
