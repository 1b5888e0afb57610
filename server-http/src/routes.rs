use crate::handlers;
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use shared::config::Config;
use tower::Layer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Build and configure the application router
pub fn build_router(state: AppState, config: &Config) -> Router {
    let api = Router::new()
        .route(
            "/characters",
            post(handlers::resolve_character).get(handlers::list_characters),
        )
        .route("/characters/{name}", delete(handlers::delete_character))
        .route("/livez", get(handlers::livez))
        .route("/readyz", get(handlers::readyz));

    Router::new()
        .nest("/api", api)
        // Middleware
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Router wrapped so trailing slashes are trimmed before route matching
pub fn build_app(state: AppState, config: &Config) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(build_router(state, config))
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::ORIGIN,
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
        ]);

    if allowed_origins.iter().any(|origin| origin == "*") {
        // Credentials cannot be combined with a wildcard origin
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}
