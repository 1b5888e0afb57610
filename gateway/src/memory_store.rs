use async_trait::async_trait;
use capsule::{Character, CharacterName, CharacterStore};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use shared::{Error, Result};

/// In-process character store for local runs without a database.
///
/// Keeps the same uniqueness rules as the SQL schema: one row per name and
/// one row per id. Contents are lost on restart.
#[derive(Default)]
pub struct MemoryCharacterStore {
    by_name: DashMap<String, Character>,
    names_by_id: DashMap<i64, String>,
}

impl MemoryCharacterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

#[async_trait]
impl CharacterStore for MemoryCharacterStore {
    async fn find_by_name(&self, name: &CharacterName) -> Result<Character> {
        self.by_name
            .get(name.as_str())
            .map(|entry| entry.value().clone())
            .ok_or(Error::NotFoundLocal)
    }

    async fn insert(&self, character: &Character) -> Result<()> {
        // The name entry stays locked until both indexes are written
        match self.by_name.entry(character.name.clone()) {
            Entry::Occupied(_) => Err(Error::AlreadyExists(character.name.clone())),
            Entry::Vacant(name_slot) => match self.names_by_id.entry(character.id) {
                Entry::Occupied(_) => Err(Error::AlreadyExists(character.name.clone())),
                Entry::Vacant(id_slot) => {
                    id_slot.insert(character.name.clone());
                    name_slot.insert(character.clone());
                    Ok(())
                }
            },
        }
    }

    async fn list_ordered(&self, limit: i64) -> Result<Vec<Character>> {
        let mut characters: Vec<Character> = self
            .by_name
            .iter()
            .map(|entry| entry.value().clone())
            .collect();

        characters.sort_by_key(|c| c.id);
        characters.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(characters)
    }

    async fn delete_by_name(&self, name: &CharacterName) -> Result<u64> {
        match self.by_name.remove(name.as_str()) {
            Some((_, removed)) => {
                self.names_by_id.remove(&removed.id);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for MemoryCharacterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCharacterStore")
            .field("len", &self.by_name.len())
            .finish()
    }
}
