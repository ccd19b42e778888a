//! Read-only projections joined for display. No business logic lives here.

use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{Booking, Showtime};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MovieSummary {
    pub title: String,
    pub poster_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeSummary {
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub cinema_hall: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

/// A booking with the movie, showtime and (for admins) user it refers to.
/// Any of the references may have been deleted since.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub movie: Option<MovieSummary>,
    pub showtime: Option<ShowtimeSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserSummary>,
}

/// Showtime as listed in schedules, with its movie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShowtimeListing {
    #[serde(flatten)]
    pub showtime: Showtime,
    pub movie: Option<MovieSummary>,
}

/// Aggregate over active bookings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BookingStats {
    pub bookings: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowtimeAnalytics {
    pub showtime_id: Uuid,
    pub total_seats: i32,
    pub booked_seats: i32,
    pub available_seats: i32,
    pub bookings_count: i64,
    pub revenue: f64,
}
