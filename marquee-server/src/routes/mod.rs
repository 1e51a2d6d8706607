use axum::{Router, http::HeaderValue, routing::get};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

use crate::handlers::{health, movies};
use crate::infra::{app_state::AppState, config::Config};

/// Movie read routes.
pub fn create_movie_router() -> Router<AppState> {
    Router::new()
        .route("/movies/all", get(movies::list_all_movies_handler))
        .route("/movies", get(movies::list_movies_handler))
        .route("/movies/ratings", get(movies::list_ratings_handler))
        .route("/movies/stats", get(movies::movie_stats_handler))
}

/// Full application: movie routes, liveness routes, CORS and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(state.config());

    Router::new()
        .route("/ping", get(health::ping_handler))
        .route("/health", get(health::health_handler))
        .merge(create_movie_router())
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(origins))
}
