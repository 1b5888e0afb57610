pub mod domain;
pub mod operation;
pub mod ports;
pub mod resolver;

pub use domain::{
    Character, CharacterName, DEFAULT_LIST_LIMIT, Origin, Resolution, WriteBack,
};
pub use operation::CharacterOperations;
pub use ports::{CharacterSource, CharacterStore};
pub use resolver::Resolver;
