//! booking.rs
//!
//! The booking transaction and its read paths.
//!
//! A booking attempt reads the showtime, validates and marks the requested
//! seats on its local copy, prices the booking from that same copy, and then
//! hands both the mutated showtime and the new booking to the store in one
//! versioned write. If another request wrote the showtime in between, the
//! store rejects the write and the whole attempt starts over from a fresh read.

use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::BookingError;
use crate::models::{Booking, BookingStats, BookingStatus, BookingView, ShowtimeAnalytics};
use crate::store::{BookingRepository, MovieRepository, ShowtimeRepository};

#[derive(Clone)]
pub struct BookingService {
    showtimes: Arc<dyn ShowtimeRepository>,
    movies: Arc<dyn MovieRepository>,
    bookings: Arc<dyn BookingRepository>,
    max_retries: u32,
}

impl BookingService {
    pub fn new(
        showtimes: Arc<dyn ShowtimeRepository>,
        movies: Arc<dyn MovieRepository>,
        bookings: Arc<dyn BookingRepository>,
        max_retries: u32,
    ) -> Self {
        Self {
            showtimes,
            movies,
            bookings,
            max_retries,
        }
    }

    /* ---------- BOOKING TRANSACTION ---------- */

    /// Books `seats` on `showtime_id` for `user_id`, all of them or none.
    pub async fn create_booking(
        &self,
        user_id: Uuid,
        showtime_id: Uuid,
        seats: Vec<String>,
    ) -> Result<Booking, BookingError> {
        let requested = normalize_selection(seats)?;
        let requested = &requested;

        self.with_retries("create_booking", move || {
            self.try_create(user_id, showtime_id, requested)
        })
        .await
    }

    async fn try_create(
        &self,
        user_id: Uuid,
        showtime_id: Uuid,
        requested: &[String],
    ) -> Result<Booking, BookingError> {
        let mut showtime = self
            .showtimes
            .find_by_id(showtime_id)
            .await?
            .ok_or(BookingError::NotFound {
                entity: "showtime",
                id: showtime_id,
            })?;

        showtime.book_seats(requested)?;

        // priced from the copy that is about to be committed
        let total_price = requested.len() as f64 * showtime.price;

        let movie = self
            .movies
            .find_by_id(showtime.movie_id)
            .await?
            .ok_or(BookingError::NotFound {
                entity: "movie",
                id: showtime.movie_id,
            })?;

        let booking = Booking::new(
            user_id,
            movie.id,
            showtime.id,
            requested.to_vec(),
            total_price,
        );
        self.bookings.commit(&showtime, &booking).await?;

        info!(
            "Booking {} created: user {}, showtime {}, seats [{}], total {:.2}",
            booking.id,
            user_id,
            showtime_id,
            booking.seats.join(", "),
            booking.total_price
        );
        Ok(booking)
    }

    /// Cancels a booking and frees its seats. Only the owner or an admin may cancel.
    pub async fn cancel_booking(
        &self,
        booking_id: Uuid,
        requester_id: Uuid,
        is_admin: bool,
    ) -> Result<Booking, BookingError> {
        self.with_retries("cancel_booking", move || {
            self.try_cancel(booking_id, requester_id, is_admin)
        })
        .await
    }

    async fn try_cancel(
        &self,
        booking_id: Uuid,
        requester_id: Uuid,
        is_admin: bool,
    ) -> Result<Booking, BookingError> {
        let mut booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(BookingError::NotFound {
                entity: "booking",
                id: booking_id,
            })?;

        if booking.user_id != requester_id && !is_admin {
            return Err(BookingError::Forbidden);
        }
        if !booking.is_active() {
            return Err(BookingError::AlreadyCancelled(booking_id));
        }

        // the showtime may have been deleted since; the booking is cancelled anyway
        let showtime = self
            .showtimes
            .find_by_id(booking.showtime_id)
            .await?
            .map(|mut showtime| {
                showtime.release_seats(&booking.seats);
                showtime
            });

        self.bookings.cancel(showtime.as_ref(), booking_id).await?;
        booking.status = BookingStatus::Cancelled;

        info!(
            "Booking {} cancelled, released seats [{}]",
            booking_id,
            booking.seats.join(", ")
        );
        Ok(booking)
    }

    // Re-runs `attempt` while it loses the race for the showtime.
    async fn with_retries<T, F, Fut>(&self, op: &str, mut attempt: F) -> Result<T, BookingError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BookingError>>,
    {
        let mut retries = 0;
        loop {
            match attempt().await {
                Err(BookingError::ConcurrencyConflict) if retries < self.max_retries => {
                    retries += 1;
                    warn!(
                        "{}: showtime modified concurrently, retry {}/{}",
                        op, retries, self.max_retries
                    );
                    tokio::task::yield_now().await;
                }
                Err(BookingError::ConcurrencyConflict) => {
                    warn!("{}: giving up after {} retries", op, retries);
                    return Err(BookingError::ConcurrencyConflict);
                }
                result => return result,
            }
        }
    }

    /* ---------- QUERIES ---------- */

    pub async fn get_user_bookings(&self, user_id: Uuid) -> Result<Vec<BookingView>, BookingError> {
        Ok(self.bookings.find_by_user(user_id).await?)
    }

    pub async fn get_all_bookings(&self) -> Result<Vec<BookingView>, BookingError> {
        Ok(self.bookings.list_all().await?)
    }

    /// Count and revenue of active bookings. Cancelled bookings are excluded.
    pub async fn get_stats(&self) -> Result<BookingStats, BookingError> {
        Ok(self.bookings.stats().await?)
    }

    pub async fn showtime_analytics(
        &self,
        showtime_id: Uuid,
    ) -> Result<ShowtimeAnalytics, BookingError> {
        let showtime = self
            .showtimes
            .find_by_id(showtime_id)
            .await?
            .ok_or(BookingError::NotFound {
                entity: "showtime",
                id: showtime_id,
            })?;
        let stats = self.bookings.showtime_stats(showtime_id).await?;

        Ok(ShowtimeAnalytics {
            showtime_id,
            total_seats: showtime.total_seats,
            booked_seats: showtime.total_seats - showtime.available_seats,
            available_seats: showtime.available_seats,
            bookings_count: stats.bookings,
            revenue: stats.revenue,
        })
    }
}

/// Trims seat numbers and drops repeats, keeping the first occurrence.
fn normalize_selection(seats: Vec<String>) -> Result<Vec<String>, BookingError> {
    let mut seen = HashSet::new();
    let requested: Vec<String> = seats
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| seen.insert(s.clone()))
        .collect();

    if requested.is_empty() {
        return Err(BookingError::EmptySelection);
    }
    Ok(requested)
}
