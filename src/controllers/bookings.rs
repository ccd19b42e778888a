use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::controllers::error::{ok, ApiError};
use crate::controllers::extract::{ApiJson, ApiPath};
use crate::controllers::showtimes::refresh_cached_showtime;
use crate::middleware::{AdminUser, AuthUser};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/bookings", get(get_all_bookings).post(create_booking))
        .route("/bookings/me", get(get_user_bookings))
        .route("/bookings/stats", get(get_stats))
        .route("/bookings/{id}/cancel", patch(cancel_booking))
}

/* ---------- BOOKINGS ---------- */

// POST /api/bookings
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct CreateBookingRequest {
    showtime_id: Uuid,
    #[validate(length(min = 1, max = 50))]
    seats: Vec<String>,
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiJson(req): ApiJson<CreateBookingRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()?;

    let booking = state
        .bookings
        .create_booking(user.user_id, req.showtime_id, req.seats)
        .await?;

    refresh_cached_showtime(&state, req.showtime_id).await;

    Ok((StatusCode::CREATED, ok(booking)))
}

// GET /api/bookings/me
async fn get_user_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = state.bookings.get_user_bookings(user.user_id).await?;
    Ok(ok(bookings))
}

// GET /api/bookings
async fn get_all_bookings(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let bookings = state.bookings.get_all_bookings().await?;
    Ok(ok(bookings))
}

// GET /api/bookings/stats
async fn get_stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.bookings.get_stats().await?;
    Ok(ok(stats))
}

// PATCH /api/bookings/{id}/cancel
async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let booking = state
        .bookings
        .cancel_booking(id, user.user_id, user.is_admin())
        .await?;

    refresh_cached_showtime(&state, booking.showtime_id).await;

    Ok(ok(booking))
}
