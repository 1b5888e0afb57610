// End-to-end read-through behaviour of the resolver over a real SQL store.

use async_trait::async_trait;
use capsule::{
    Character, CharacterName, CharacterOperations, CharacterSource, CharacterStore, Origin,
    Resolver, WriteBack,
};
use gateway::{MemoryCharacterStore, SqlCharacterStore};
use shared::{Error, Result};
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Barrier;

/// Catalog stub that counts calls and can hold callers until N of them arrive
struct CountingSource {
    catalog: HashMap<String, Character>,
    calls: AtomicUsize,
    gate: Option<Barrier>,
}

impl CountingSource {
    fn new(characters: Vec<Character>) -> Self {
        Self {
            catalog: characters
                .into_iter()
                .map(|c| (c.name.to_lowercase(), c))
                .collect(),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    fn gated(characters: Vec<Character>, callers: usize) -> Self {
        Self {
            gate: Some(Barrier::new(callers)),
            ..Self::new(characters)
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CharacterSource for CountingSource {
    async fn fetch_by_name(&self, name: &CharacterName) -> Result<Vec<Character>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.wait().await;
        }
        Ok(self.catalog.get(name.as_str()).cloned().into_iter().collect())
    }
}

async fn sqlite_store() -> Arc<SqlCharacterStore> {
    install_default_drivers();
    let pool = AnyPoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    let store = SqlCharacterStore::new(pool, Duration::from_secs(5));
    store.migrate().await.unwrap();
    Arc::new(store)
}

async fn rows_named(store: &SqlCharacterStore, name: &str) -> usize {
    let ids: Vec<(i64,)> = sqlx::query_as("SELECT id FROM characters WHERE name = $1")
        .bind(name)
        .fetch_all(store.pool())
        .await
        .unwrap();
    ids.len()
}

fn goku() -> Character {
    Character::new(
        1,
        "Goku",
        "60.000.000",
        "Saiyan",
        "https://dragonball-api.com/characters/goku_normal.webp",
    )
}

#[tokio::test]
async fn test_idempotent_read_through() {
    let store = sqlite_store().await;
    let source = Arc::new(CountingSource::new(vec![goku()]));
    let resolver = Resolver::new(store.clone(), source.clone());

    let first = resolver.resolve("goku").await.unwrap();
    let second = resolver.resolve("goku").await.unwrap();

    assert_eq!(first.character, second.character);
    assert_eq!(first.origin, Origin::Remote(WriteBack::Stored));
    assert_eq!(second.origin, Origin::Local);
    assert_eq!(source.calls(), 1);
    assert_eq!(rows_named(&store, "goku").await, 1);
}

#[tokio::test]
async fn test_fast_path_skips_upstream() {
    let store = sqlite_store().await;
    store.insert(&goku().normalized().unwrap()).await.unwrap();
    let source = Arc::new(CountingSource::new(vec![goku()]));
    let resolver = Resolver::new(store.clone(), source.clone());

    let resolution = resolver.resolve("goku").await.unwrap();

    assert!(resolution.origin.is_local());
    assert_eq!(source.calls(), 0);
}

#[tokio::test]
async fn test_case_normalization() {
    let store = sqlite_store().await;
    let source = Arc::new(CountingSource::new(vec![goku()]));
    let resolver = Resolver::new(store.clone(), source.clone());

    let upper = resolver.resolve("Goku").await.unwrap();
    let lower = resolver.resolve("goku").await.unwrap();

    assert_eq!(upper.character, lower.character);
    assert_eq!(lower.character.name, "goku");
    assert!(lower.origin.is_local());
    assert_eq!(rows_named(&store, "goku").await, 1);
    assert_eq!(rows_named(&store, "Goku").await, 0);
}

#[tokio::test]
async fn test_not_found_propagation() {
    let store = sqlite_store().await;
    let source = Arc::new(CountingSource::new(vec![goku()]));
    let resolver = Resolver::new(store.clone(), source);

    let result = resolver.resolve("unknown").await;

    assert!(matches!(result, Err(Error::NotFoundRemote)));
    assert_eq!(rows_named(&store, "unknown").await, 0);
    assert!(resolver.list(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_race_safety() {
    let store = sqlite_store().await;
    // Both resolves must have missed locally before either may insert
    let source = Arc::new(CountingSource::gated(vec![goku()], 2));
    let resolver = Arc::new(Resolver::new(store.clone(), source.clone()));

    let (a, b) = tokio::join!(resolver.resolve("goku"), resolver.resolve("goku"));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.character, b.character);
    assert_eq!(source.calls(), 2);
    let mut write_backs = vec![a.origin, b.origin];
    write_backs.sort_by_key(|origin| matches!(origin, Origin::Remote(WriteBack::AlreadyCached)));
    assert_eq!(
        write_backs,
        vec![
            Origin::Remote(WriteBack::Stored),
            Origin::Remote(WriteBack::AlreadyCached)
        ]
    );
    assert_eq!(rows_named(&store, "goku").await, 1);
}

#[tokio::test]
async fn test_race_safety_in_memory() {
    let store = Arc::new(MemoryCharacterStore::new());
    let source = Arc::new(CountingSource::gated(vec![goku()], 2));
    let resolver = Arc::new(Resolver::new(store.clone(), source));

    let (a, b) = tokio::join!(resolver.resolve("goku"), resolver.resolve("GOKU"));

    assert_eq!(a.unwrap().character, b.unwrap().character);
    assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn test_delete_semantics() {
    let store = sqlite_store().await;
    let source = Arc::new(CountingSource::new(vec![goku()]));
    let resolver = Resolver::new(store.clone(), source.clone());

    assert!(matches!(
        resolver.delete("goku").await,
        Err(Error::NotDeleted(_))
    ));

    resolver.resolve("goku").await.unwrap();
    resolver.delete("Goku").await.unwrap();
    assert_eq!(rows_named(&store, "goku").await, 0);

    // Behaves as a fresh miss again
    let refetched = resolver.resolve("goku").await.unwrap();
    assert_eq!(refetched.origin, Origin::Remote(WriteBack::Stored));
    assert_eq!(source.calls(), 2);
    assert_eq!(rows_named(&store, "goku").await, 1);
}

#[tokio::test]
async fn test_bounded_listing() {
    let store = sqlite_store().await;
    for id in (1..=150_i64).rev() {
        store
            .insert(&Character::new(id, format!("fighter-{}", id), "1", "Human", ""))
            .await
            .unwrap();
    }
    let resolver = Resolver::new(store.clone(), Arc::new(CountingSource::new(vec![])));

    let listed = resolver.list(Some(100)).await.unwrap();

    assert_eq!(listed.len(), 100);
    let ids: Vec<i64> = listed.iter().map(|c| c.id).collect();
    let expected: Vec<i64> = (1..=100).collect();
    assert_eq!(ids, expected);

    assert_eq!(resolver.list(None).await.unwrap().len(), 100);
    assert_eq!(resolver.list(Some(200)).await.unwrap().len(), 150);
}
