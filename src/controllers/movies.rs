use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::error::{ok, ApiError};
use crate::controllers::extract::{ApiJson, ApiPath};
use crate::middleware::AdminUser;
use crate::models::{MovieDraft, MovieStatus};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies", get(list_movies).post(create_movie))
        .route(
            "/movies/{id}",
            get(get_movie).put(update_movie).delete(delete_movie),
        )
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct MovieRequest {
    #[validate(length(min = 1, max = 200))]
    title: String,
    #[validate(length(min = 20))]
    description: String,
    #[serde(default)]
    genre: Vec<String>,
    #[validate(range(min = 1, max = 1000))]
    duration: i32,
    release_date: NaiveDate,
    #[validate(length(min = 1))]
    poster_url: String,
    #[serde(default)]
    trailer_url: String,
    #[serde(default)]
    cast: Vec<String>,
    #[serde(default)]
    status: MovieStatus,
}

impl From<MovieRequest> for MovieDraft {
    fn from(req: MovieRequest) -> Self {
        MovieDraft {
            title: req.title.trim().to_string(),
            description: req.description,
            genre: req.genre,
            duration: req.duration,
            release_date: req.release_date,
            poster_url: req.poster_url,
            trailer_url: req.trailer_url,
            cast: req.cast,
            status: req.status,
        }
    }
}

/* ---------- MOVIES ---------- */

// GET /api/movies
async fn list_movies(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    if let Some(movies) = state.cache.get_movies().await {
        return Ok(ok(movies));
    }

    let generation = state.cache.movies_generation().await;
    let movies = state.movies.list_movies().await?;
    if let Some(generation) = generation {
        state.cache.cache_movies(&movies, generation).await;
    }
    Ok(ok(movies))
}

// GET /api/movies/{id}
async fn get_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let movie = state.movies.get_movie(id).await?;
    Ok(ok(movie))
}

// POST /api/movies
async fn create_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<MovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let movie = state.movies.create_movie(req.into()).await?;
    state.cache.invalidate_movies().await;

    tracing::info!("Admin {} created movie {}", admin.email, movie.id);
    Ok((StatusCode::CREATED, ok(movie)))
}

// PUT /api/movies/{id}
async fn update_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<MovieRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let movie = state.movies.update_movie(id, req.into()).await?;
    state.cache.invalidate_movies().await;
    Ok(ok(movie))
}

// DELETE /api/movies/{id}
async fn delete_movie(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    // showtimes go with the movie, so their cached seat maps must go too
    let showtimes = state.showtimes.showtimes_for_movie(id).await?;

    state.movies.delete_movie(id).await?;
    state.cache.invalidate_movies().await;
    for showtime in &showtimes {
        state.cache.invalidate_showtime(showtime.id).await;
    }

    tracing::info!(
        "Admin {} deleted movie {} with {} showtimes",
        admin.email,
        id,
        showtimes.len()
    );
    Ok(ok(serde_json::json!({ "message": "Movie deleted" })))
}
