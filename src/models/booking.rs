use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "Booked",
            BookingStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Booked" => Ok(BookingStatus::Booked),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status '{other}'")),
        }
    }
}

/// A confirmed reservation of seats on one showtime by one user.
///
/// Only `status` changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub movie_id: Uuid,
    pub showtime_id: Uuid,
    pub seats: Vec<String>,
    pub total_price: f64,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(
        user_id: Uuid,
        movie_id: Uuid,
        showtime_id: Uuid,
        seats: Vec<String>,
        total_price: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            movie_id,
            showtime_id,
            seats,
            total_price,
            status: BookingStatus::Booked,
            created_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Booked
    }
}
