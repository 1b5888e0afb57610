use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use capsule::Character;
use tracing::debug;

use crate::api::{ApiError, ListQuery, NAME_REQUIRED, ResolveRequest};
use crate::state::AppState;

pub const CACHE_HEADER: &str = "x-capsule-cache";

/// POST /api/characters
pub async fn resolve_character(
    State(state): State<AppState>,
    body: Result<Json<ResolveRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = body.map_err(|rejection| {
        debug!("Rejected resolve body: {}", rejection);
        ApiError::bad_request(NAME_REQUIRED)
    })?;

    if request.name.trim().is_empty() {
        return Err(ApiError::bad_request(NAME_REQUIRED));
    }

    let resolution = state.operations.resolve(&request.name).await?;
    let cache = if resolution.origin.is_local() {
        "hit"
    } else {
        "miss"
    };

    Ok(([(CACHE_HEADER, cache)], Json(resolution.character)))
}

/// GET /api/characters?limit=N
pub async fn list_characters(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Character>>, ApiError> {
    // `?limit=` means no limit was given
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<i64>().map_err(|_| {
            ApiError::bad_request(format!("limit must be an integer, got '{}'", raw))
        })?),
    };

    let characters = state.operations.list(limit).await?;
    Ok(Json(characters))
}

/// DELETE /api/characters/{name}
pub async fn delete_character(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.operations.delete(&name).await?;
    Ok(StatusCode::OK)
}
