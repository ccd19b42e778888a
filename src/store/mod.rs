//! Persistence contracts of the booking core.
//!
//! Every write of a showtime is conditional on the `version` the caller read
//! and bumps it, so two read-modify-write sequences on the same showtime
//! cannot both commit. A stale write fails with `StoreError::VersionConflict`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Booking, BookingStats, BookingView, Movie, Showtime, ShowtimeListing, ShowtimeUpdate, User,
};

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait MovieRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError>;

    /// Newest first.
    async fn list(&self) -> Result<Vec<Movie>, StoreError>;

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError>;

    /// Returns `false` when the movie does not exist.
    async fn update(&self, movie: &Movie) -> Result<bool, StoreError>;

    /// Removes the movie together with its showtimes. Bookings keep their references.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait ShowtimeRepository: Send + Sync {
    /// Loads the showtime with its full seat list.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Showtime>, StoreError>;

    /// Ordered by show date and time.
    async fn find_by_movie(&self, movie_id: Uuid) -> Result<Vec<Showtime>, StoreError>;

    async fn list(&self) -> Result<Vec<ShowtimeListing>, StoreError>;

    async fn insert(&self, showtime: &Showtime) -> Result<(), StoreError>;

    /// Writes the seat list and seat counters in one statement, provided the
    /// stored version still equals `showtime.version`. Returns the new version.
    async fn save(&self, showtime: &Showtime) -> Result<i64, StoreError>;

    /// Edits schedule fields and bumps the version. `None` if the showtime is gone.
    async fn update_schedule(
        &self,
        id: Uuid,
        update: &ShowtimeUpdate,
    ) -> Result<Option<Showtime>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Saves the mutated showtime (versioned, see [`ShowtimeRepository::save`])
    /// and inserts the booking, both or neither.
    async fn commit(&self, showtime: &Showtime, booking: &Booking) -> Result<(), StoreError>;

    /// Saves the showtime with released seats (if it still exists) and flips the
    /// booking to `Cancelled`, both or neither. Fails with `VersionConflict` when
    /// the booking is no longer `Booked`.
    async fn cancel(&self, showtime: Option<&Showtime>, booking_id: Uuid) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError>;

    /// Bookings of one user, newest first, joined with movie and showtime.
    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<BookingView>, StoreError>;

    /// All bookings, newest first, joined with movie, showtime and user.
    async fn list_all(&self) -> Result<Vec<BookingView>, StoreError>;

    /// Count and revenue over `Booked` bookings.
    async fn stats(&self) -> Result<BookingStats, StoreError>;

    /// Count and revenue over `Booked` bookings of one showtime.
    async fn showtime_stats(&self, showtime_id: Uuid) -> Result<BookingStats, StoreError>;
}
