use serde::{Deserialize, Serialize};
use shared::{Error, Result};
use std::fmt;

/// Row limit applied to listings when the caller does not pass one
pub const DEFAULT_LIST_LIMIT: i64 = 100;

/// A character as served to callers and stored locally.
///
/// `id` is assigned by the upstream catalog. `ki` is kept as text because the
/// catalog formats it with grouped digits ("60.000.000") or words ("unknown").
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub ki: String,
    pub race: String,
    pub image: String,
}

impl Character {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        ki: impl Into<String>,
        race: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            ki: ki.into(),
            race: race.into(),
            image: image.into(),
        }
    }

    /// Lowercases the name so the record can be written under its natural key
    pub fn normalized(self) -> Result<Self> {
        let name = CharacterName::parse(&self.name)?;
        Ok(Self {
            name: name.into_inner(),
            ..self
        })
    }
}

/// Trimmed, lowercased, non-empty character name.
///
/// Stores only accept this type, so every read and write goes through the
/// same normalization.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterName(String);

impl CharacterName {
    pub fn parse(raw: &str) -> Result<Self> {
        let name = raw.trim().to_lowercase();
        if name.is_empty() {
            return Err(Error::InvalidInput("name is required".to_string()));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for CharacterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What happened to a freshly fetched character on its way into the store
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteBack {
    Stored,
    /// A concurrent resolve inserted the same name first
    AlreadyCached,
    /// The insert failed; the character may not be cached
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Origin {
    Local,
    Remote(WriteBack),
}

impl Origin {
    pub fn is_local(&self) -> bool {
        matches!(self, Origin::Local)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub character: Character,
    pub origin: Origin,
}

impl Resolution {
    pub fn local(character: Character) -> Self {
        Self {
            character,
            origin: Origin::Local,
        }
    }

    pub fn remote(character: Character, write_back: WriteBack) -> Self {
        Self {
            character,
            origin: Origin::Remote(write_back),
        }
    }
}
