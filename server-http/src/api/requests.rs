use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    #[serde(default)]
    pub name: String,
}

/// `limit` stays textual so a malformed value gets a JSON error body
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}
