use axum::{
    extract::{Query, State},
    response::Json,
};
use marquee_model::{MovieRecord, Summary};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::AppResult;
use crate::infra::app_state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MoviesQuery {
    pub rating: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub summary: Summary,
    pub text: String,
}

/// `GET /movies/all`
pub async fn list_all_movies_handler(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let movies = state.run_query(|query| query.list_all()).await?;
    Ok(Json(movies))
}

/// `GET /movies?rating=<r>`. A blank or missing rating lists everything.
pub async fn list_movies_handler(
    State(state): State<AppState>,
    Query(params): Query<MoviesQuery>,
) -> AppResult<Json<Vec<MovieRecord>>> {
    let rating = params
        .rating
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    debug!(rating = ?rating, "listing movies");

    let movies = state
        .run_query(move |query| query.list(rating.as_deref()))
        .await?;
    Ok(Json(movies))
}

/// `GET /movies/ratings`
pub async fn list_ratings_handler(State(state): State<AppState>) -> AppResult<Json<Vec<String>>> {
    let ratings = state
        .run_query(|query| query.list_distinct_ratings())
        .await?;
    Ok(Json(ratings))
}

/// `GET /movies/stats`
pub async fn movie_stats_handler(State(state): State<AppState>) -> AppResult<Json<StatsResponse>> {
    let summary = state.run_query(|query| query.summary()).await?;
    let text = summary.to_string();
    Ok(Json(StatsResponse { summary, text }))
}
