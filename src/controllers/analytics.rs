//! analytics.rs
//!
//! Sales figures for a single showtime: seat occupancy from the seat map,
//! booking count and revenue from active bookings.

use axum::{
    extract::State,
    response::IntoResponse,
    routing::get,
    Router,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::controllers::error::{ok, ApiError};
use crate::controllers::extract::ApiPath;
use crate::middleware::AdminUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/analytics/showtimes/{id}", get(get_showtime_analytics))
}

/// GET /api/analytics/showtimes/{id}
async fn get_showtime_analytics(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let analytics = state.bookings.showtime_analytics(id).await?;

    tracing::info!(
        "Analytics for showtime {}: {}/{} seats booked, revenue {:.2}",
        id,
        analytics.booked_seats,
        analytics.total_seats,
        analytics.revenue
    );

    Ok(ok(analytics))
}
