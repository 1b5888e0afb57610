use async_trait::async_trait;
use capsule::{Character, CharacterName, CharacterStore};
use shared::{Error, Result};
use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{AnyPool, FromRow};
use std::future::Future;
use std::time::Duration;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS characters (
    id BIGINT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    ki TEXT NOT NULL,
    race TEXT NOT NULL,
    image TEXT NOT NULL
)";
const INSERT: &str = "INSERT INTO characters (id, name, ki, race, image) VALUES ($1, $2, $3, $4, $5)";
const SELECT_BY_NAME: &str = "SELECT id, name, ki, race, image FROM characters WHERE name = $1";
const SELECT_ORDERED: &str = "SELECT id, name, ki, race, image FROM characters ORDER BY id LIMIT $1";
const DELETE_BY_NAME: &str = "DELETE FROM characters WHERE name = $1";

#[derive(FromRow)]
struct CharacterRow {
    id: i64,
    name: String,
    ki: String,
    race: String,
    image: String,
}

impl From<CharacterRow> for Character {
    fn from(row: CharacterRow) -> Self {
        Character::new(row.id, row.name, row.ki, row.race, row.image)
    }
}

/// Relational character store.
///
/// Runs on any sqlx `Any` driver: PostgreSQL in deployments, SQLite in tests.
/// Each operation is bounded by `timeout`; writes run in their own transaction,
/// which rolls back when dropped before commit.
#[derive(Clone)]
pub struct SqlCharacterStore {
    pool: AnyPool,
    timeout: Duration,
}

impl SqlCharacterStore {
    pub async fn connect(url: &str, max_connections: u32, timeout: Duration) -> Result<Self> {
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(timeout)
            .connect(url)
            .await
            .map_err(|e| Error::Storage(format!("Failed to connect to database: {}", e)))?;

        Ok(Self::new(pool, timeout))
    }

    pub fn new(pool: AnyPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Creates the characters table if it is missing
    pub async fn migrate(&self) -> Result<()> {
        self.bounded("migrate", async {
            sqlx::query(CREATE_TABLE)
                .execute(&self.pool)
                .await
                .map_err(storage("migrate"))?;
            Ok(())
        })
        .await
    }

    async fn bounded<T, F>(&self, op: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| Error::Storage(format!("{} timed out after {:?}", op, self.timeout)))?
    }
}

fn storage(op: &'static str) -> impl Fn(sqlx::Error) -> Error {
    move |e| Error::Storage(format!("{} failed: {}", op, e))
}

fn insert_error(name: &str, e: sqlx::Error) -> Error {
    match e {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            Error::AlreadyExists(name.to_string())
        }
        other => storage("insert")(other),
    }
}

#[async_trait]
impl CharacterStore for SqlCharacterStore {
    async fn find_by_name(&self, name: &CharacterName) -> Result<Character> {
        self.bounded("lookup", async {
            sqlx::query_as::<_, CharacterRow>(SELECT_BY_NAME)
                .bind(name.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage("lookup"))?
                .map(Character::from)
                .ok_or(Error::NotFoundLocal)
        })
        .await
    }

    async fn insert(&self, character: &Character) -> Result<()> {
        self.bounded("insert", async {
            let mut tx = self.pool.begin().await.map_err(storage("insert"))?;

            sqlx::query(INSERT)
                .bind(character.id)
                .bind(character.name.as_str())
                .bind(character.ki.as_str())
                .bind(character.race.as_str())
                .bind(character.image.as_str())
                .execute(&mut *tx)
                .await
                .map_err(|e| insert_error(&character.name, e))?;

            tx.commit()
                .await
                .map_err(|e| insert_error(&character.name, e))
        })
        .await
    }

    async fn list_ordered(&self, limit: i64) -> Result<Vec<Character>> {
        self.bounded("list", async {
            let rows = sqlx::query_as::<_, CharacterRow>(SELECT_ORDERED)
                .bind(limit)
                .fetch_all(&self.pool)
                .await
                .map_err(storage("list"))?;

            Ok(rows.into_iter().map(Character::from).collect())
        })
        .await
    }

    async fn delete_by_name(&self, name: &CharacterName) -> Result<u64> {
        self.bounded("delete", async {
            let mut tx = self.pool.begin().await.map_err(storage("delete"))?;

            let affected = sqlx::query(DELETE_BY_NAME)
                .bind(name.as_str())
                .execute(&mut *tx)
                .await
                .map_err(storage("delete"))?
                .rows_affected();

            tx.commit().await.map_err(storage("delete"))?;
            Ok(affected)
        })
        .await
    }

    async fn ping(&self) -> Result<()> {
        self.bounded("ping", async {
            sqlx::query("SELECT 1")
                .execute(&self.pool)
                .await
                .map_err(storage("ping"))?;
            Ok(())
        })
        .await
    }
}

impl std::fmt::Debug for SqlCharacterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlCharacterStore")
            .field("pool", &"<sqlx::AnyPool>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
