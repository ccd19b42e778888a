use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{Seat, ShowtimeSummary};

/// A scheduled screening with its own price and seat inventory.
///
/// The showtime owns its seat list. `available_seats` always equals
/// `total_seats` minus the booked seats, and `version` is bumped by the store
/// on every write so stale read-modify-write sequences can be rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Showtime {
    pub id: Uuid,
    pub movie_id: Uuid,
    pub cinema_hall: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub price: f64,
    pub total_seats: i32,
    pub available_seats: i32,
    pub seats: Vec<Seat>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin edit of the schedule fields. The seat map is never touched by an edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowtimeUpdate {
    pub cinema_hall: Option<String>,
    pub show_date: Option<NaiveDate>,
    pub show_time: Option<NaiveTime>,
    pub price: Option<f64>,
}

impl Showtime {
    pub fn new(
        movie_id: Uuid,
        cinema_hall: String,
        show_date: NaiveDate,
        show_time: NaiveTime,
        price: f64,
        seats: Vec<Seat>,
    ) -> Self {
        let now = Utc::now();
        let mut showtime = Self {
            id: Uuid::new_v4(),
            movie_id,
            cinema_hall,
            show_date,
            show_time,
            price,
            total_seats: 0,
            available_seats: 0,
            seats,
            version: 0,
            created_at: now,
            updated_at: now,
        };
        showtime.recount();
        showtime
    }

    pub fn seat(&self, seat_number: &str) -> Option<&Seat> {
        self.seats.iter().find(|s| s.seat_number == seat_number)
    }

    pub fn booked_count(&self) -> usize {
        self.seats.iter().filter(|s| s.is_booked).count()
    }

    /// Marks every requested seat booked, or none of them.
    ///
    /// Unknown seats are reported before already-booked ones; both errors
    /// carry the full list of offending seat numbers.
    pub fn book_seats(&mut self, requested: &[String]) -> Result<(), BookingError> {
        let index: HashMap<&str, usize> = self
            .seats
            .iter()
            .enumerate()
            .map(|(i, s)| (s.seat_number.as_str(), i))
            .collect();

        let mut invalid = Vec::new();
        let mut unavailable = Vec::new();
        let mut targets = Vec::with_capacity(requested.len());

        for number in requested {
            match index.get(number.as_str()) {
                None => invalid.push(number.clone()),
                Some(&i) if self.seats[i].is_booked => unavailable.push(number.clone()),
                Some(&i) => targets.push(i),
            }
        }

        if !invalid.is_empty() {
            return Err(BookingError::InvalidSeat(invalid));
        }
        if !unavailable.is_empty() {
            return Err(BookingError::SeatUnavailable(unavailable));
        }

        for i in targets {
            self.seats[i].is_booked = true;
        }
        self.recount();
        Ok(())
    }

    /// Frees the given seats. Unknown numbers are ignored.
    pub fn release_seats(&mut self, seat_numbers: &[String]) {
        for seat in self.seats.iter_mut() {
            if seat_numbers.contains(&seat.seat_number) {
                seat.is_booked = false;
            }
        }
        self.recount();
    }

    pub fn apply(&mut self, update: ShowtimeUpdate) {
        if let Some(hall) = update.cinema_hall {
            self.cinema_hall = hall;
        }
        if let Some(date) = update.show_date {
            self.show_date = date;
        }
        if let Some(time) = update.show_time {
            self.show_time = time;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
    }

    pub fn summary(&self) -> ShowtimeSummary {
        ShowtimeSummary {
            show_date: self.show_date,
            show_time: self.show_time,
            cinema_hall: self.cinema_hall.clone(),
        }
    }

    fn recount(&mut self) {
        self.total_seats = self.seats.len() as i32;
        self.available_seats = self.total_seats - self.booked_count() as i32;
    }
}
