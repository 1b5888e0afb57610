pub mod characters;
pub mod health;

pub use characters::{CACHE_HEADER, delete_character, list_characters, resolve_character};
pub use health::{livez, readyz};
