use axum::{Json, extract::State, http::StatusCode};
use tracing::error;

use crate::api::{ErrorResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/livez
pub async fn livez() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// GET /api/readyz
pub async fn readyz(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<ErrorResponse>)> {
    match state.operations.ping().await {
        Ok(()) => Ok(Json(HealthResponse::ok())),
        Err(e) => {
            error!("Readiness check failed: {}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("database is down")),
            ))
        }
    }
}
