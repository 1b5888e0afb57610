use async_trait::async_trait;
use capsule::{Character, CharacterName, CharacterSource};
use reqwest::Client;
use serde::Deserialize;
use shared::{Error, Result};
use std::time::Duration;
use tracing::debug;

/// Ki arrives as text ("60.000.000", "unknown") or, in older records, as a number
#[derive(Deserialize)]
#[serde(untagged)]
enum Ki {
    Text(String),
    Number(serde_json::Number),
}

impl From<Ki> for String {
    fn from(ki: Ki) -> Self {
        match ki {
            Ki::Text(text) => text,
            Ki::Number(number) => number.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct UpstreamCharacter {
    id: i64,
    name: String,
    #[serde(default)]
    ki: Option<Ki>,
    #[serde(default)]
    race: String,
    #[serde(default)]
    image: String,
}

impl From<UpstreamCharacter> for Character {
    fn from(raw: UpstreamCharacter) -> Self {
        Character::new(
            raw.id,
            raw.name,
            raw.ki.map(String::from).unwrap_or_default(),
            raw.race,
            raw.image,
        )
    }
}

/// Filtered searches return a bare array; unfiltered ones a paginated envelope
#[derive(Deserialize)]
#[serde(untagged)]
enum SearchResponse {
    List(Vec<UpstreamCharacter>),
    Page { items: Vec<UpstreamCharacter> },
}

impl SearchResponse {
    fn into_characters(self) -> Vec<Character> {
        let records = match self {
            SearchResponse::List(records) | SearchResponse::Page { items: records } => records,
        };
        records.into_iter().map(Character::from).collect()
    }
}

/// Fetches characters from the catalog's search-by-name endpoint
#[derive(Clone)]
pub struct HttpCharacterSource {
    client: Client,
    base_url: String,
}

impl HttpCharacterSource {
    /// `timeout` bounds each request end to end, connect included
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build http client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl CharacterSource for HttpCharacterSource {
    async fn fetch_by_name(&self, name: &CharacterName) -> Result<Vec<Character>> {
        let url = format!("{}/characters", self.base_url);
        debug!("GET {}?name={}", url, name);

        let response = self
            .client
            .get(&url)
            .query(&[("name", name.as_str())])
            .send()
            .await
            .map_err(|e| Error::Upstream(format!("failed to perform request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream(format!(
                "received non-2xx status code: {}",
                status
            )));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| Error::Upstream(format!("failed to decode response: {}", e)))?;

        Ok(body.into_characters())
    }
}

impl std::fmt::Debug for HttpCharacterSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCharacterSource")
            .field("base_url", &self.base_url)
            .finish()
    }
}
