use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::error::{ok, ApiError};
use crate::controllers::extract::{ApiJson, ApiPath};
use crate::middleware::AdminUser;
use crate::models::ShowtimeUpdate;
use crate::seat_map::{MAX_ROWS, MAX_SEATS_PER_ROW};
use crate::services::NewShowtime;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/showtimes", get(list_showtimes).post(create_showtime))
        .route(
            "/showtimes/{id}",
            get(get_showtime).put(update_showtime).delete(delete_showtime),
        )
        .route("/showtimes/movie/{movie_id}", get(showtimes_for_movie))
}

/* ---------- helpers ---------- */

// Accepts "19:30" as well as "19:30:00"
fn parse_show_time(raw: &str) -> Result<NaiveTime, ApiError> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ApiError::bad_request(format!("showTime '{raw}' is not HH:MM")))
}

// Pushes the committed seat map into the cache after a write. The versioned
// write keeps any older snapshot a concurrent reader is about to cache out.
pub(crate) async fn refresh_cached_showtime(state: &AppState, id: Uuid) {
    if !state.cache.is_enabled() {
        return;
    }
    match state.showtimes.get_showtime(id).await {
        Ok(showtime) => {
            state.cache.cache_showtime(&showtime).await;
        }
        Err(e) => {
            tracing::warn!("Could not refresh cached showtime {}: {}", id, e);
            state.cache.invalidate_showtime(id).await;
        }
    }
}

/* ---------- SHOWTIMES ---------- */

// POST /api/showtimes
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateShowtimeRequest {
    movie_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    cinema_hall: String,
    show_date: NaiveDate,
    show_time: String,
    #[validate(range(min = 0.0))]
    price: f64,
    #[validate(range(min = 1, max = MAX_ROWS))]
    rows: Option<u32>,
    #[validate(range(min = 1, max = MAX_SEATS_PER_ROW))]
    seats_per_row: Option<u32>,
}

async fn create_showtime(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiJson(req): ApiJson<CreateShowtimeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let show_time = parse_show_time(&req.show_time)?;

    let showtime = state
        .showtimes
        .create_showtime(NewShowtime {
            movie_id: req.movie_id,
            cinema_hall: req.cinema_hall,
            show_date: req.show_date,
            show_time,
            price: req.price,
            rows: req.rows,
            seats_per_row: req.seats_per_row,
        })
        .await?;

    tracing::info!("Admin {} scheduled showtime {}", admin.email, showtime.id);
    Ok((StatusCode::CREATED, ok(showtime)))
}

// GET /api/showtimes
async fn list_showtimes(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let showtimes = state.showtimes.list_showtimes().await?;
    Ok(ok(showtimes))
}

// GET /api/showtimes/{id}
async fn get_showtime(
    State(state): State<Arc<AppState>>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(showtime) = state.cache.get_showtime(id).await {
        return Ok(([("X-Cache", "HIT")], ok(showtime)));
    }

    let showtime = state.showtimes.get_showtime(id).await?;
    state.cache.cache_showtime(&showtime).await;
    Ok(([("X-Cache", "MISS")], ok(showtime)))
}

// GET /api/showtimes/movie/{movie_id}
async fn showtimes_for_movie(
    State(state): State<Arc<AppState>>,
    ApiPath(movie_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let showtimes = state.showtimes.showtimes_for_movie(movie_id).await?;
    Ok(ok(showtimes))
}

// PUT /api/showtimes/{id}
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct UpdateShowtimeRequest {
    #[validate(length(min = 1, max = 100))]
    cinema_hall: Option<String>,
    show_date: Option<NaiveDate>,
    show_time: Option<String>,
    #[validate(range(min = 0.0))]
    price: Option<f64>,
}

async fn update_showtime(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<UpdateShowtimeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;
    let show_time = req.show_time.as_deref().map(parse_show_time).transpose()?;

    let update = ShowtimeUpdate {
        cinema_hall: req.cinema_hall.map(|hall| hall.trim().to_string()),
        show_date: req.show_date,
        show_time,
        price: req.price,
    };
    let showtime = state.showtimes.update_showtime(id, update).await?;
    state.cache.cache_showtime(&showtime).await;

    Ok(ok(showtime))
}

// DELETE /api/showtimes/{id}
async fn delete_showtime(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state.showtimes.delete_showtime(id).await?;
    state.cache.invalidate_showtime(id).await;

    tracing::info!("Admin {} deleted showtime {}", admin.email, id);
    Ok(ok(serde_json::json!({ "message": "Showtime deleted" })))
}
