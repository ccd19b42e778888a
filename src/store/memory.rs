use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Booking, BookingStats, BookingStatus, BookingView, Movie, Showtime, ShowtimeListing,
    ShowtimeUpdate, User,
};
use crate::store::{BookingRepository, MovieRepository, ShowtimeRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    movies: HashMap<Uuid, Movie>,
    showtimes: HashMap<Uuid, Showtime>,
    // insertion order == creation order
    bookings: Vec<Booking>,
}

/// Process-local store with the same versioning rules as the Postgres one.
///
/// All tables sit behind a single lock, so a multi-table write (seat map plus
/// booking) is atomic.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

// === Helpers ===

fn write_seats(tables: &mut Tables, showtime: &Showtime) -> Result<i64, StoreError> {
    let stored = tables
        .showtimes
        .get_mut(&showtime.id)
        .ok_or(StoreError::VersionConflict { id: showtime.id })?;

    if stored.version != showtime.version {
        return Err(StoreError::VersionConflict { id: showtime.id });
    }

    stored.seats = showtime.seats.clone();
    stored.total_seats = showtime.total_seats;
    stored.available_seats = showtime.available_seats;
    stored.version += 1;
    stored.updated_at = Utc::now();
    Ok(stored.version)
}

fn view(tables: &Tables, booking: &Booking, with_user: bool) -> BookingView {
    BookingView {
        booking: booking.clone(),
        movie: tables.movies.get(&booking.movie_id).map(Movie::summary),
        showtime: tables
            .showtimes
            .get(&booking.showtime_id)
            .map(Showtime::summary),
        user: if with_user {
            tables.users.get(&booking.user_id).map(User::summary)
        } else {
            None
        },
    }
}

fn active_stats<'a>(bookings: impl Iterator<Item = &'a Booking>) -> BookingStats {
    bookings
        .filter(|b| b.is_active())
        .fold(BookingStats { bookings: 0, revenue: 0.0 }, |acc, b| BookingStats {
            bookings: acc.bookings + 1,
            revenue: acc.revenue + b.total_price,
        })
}

// === Repositories ===

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate(format!("email {}", user.email)));
        }
        tables.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[async_trait]
impl MovieRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        Ok(self.tables.read().await.movies.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        let mut movies: Vec<Movie> = self.tables.read().await.movies.values().cloned().collect();
        movies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(movies)
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        self.tables.write().await.movies.insert(movie.id, movie.clone());
        Ok(())
    }

    async fn update(&self, movie: &Movie) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        match tables.movies.get_mut(&movie.id) {
            Some(stored) => {
                *stored = movie.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.movies.remove(&id).is_none() {
            return Ok(false);
        }
        tables.showtimes.retain(|_, s| s.movie_id != id);
        Ok(true)
    }
}

#[async_trait]
impl ShowtimeRepository for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Showtime>, StoreError> {
        Ok(self.tables.read().await.showtimes.get(&id).cloned())
    }

    async fn find_by_movie(&self, movie_id: Uuid) -> Result<Vec<Showtime>, StoreError> {
        let tables = self.tables.read().await;
        let mut showtimes: Vec<Showtime> = tables
            .showtimes
            .values()
            .filter(|s| s.movie_id == movie_id)
            .cloned()
            .collect();
        showtimes.sort_by_key(|s| (s.show_date, s.show_time));
        Ok(showtimes)
    }

    async fn list(&self) -> Result<Vec<ShowtimeListing>, StoreError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<ShowtimeListing> = tables
            .showtimes
            .values()
            .map(|s| ShowtimeListing {
                showtime: s.clone(),
                movie: tables.movies.get(&s.movie_id).map(Movie::summary),
            })
            .collect();
        listings.sort_by_key(|l| (l.showtime.show_date, l.showtime.show_time));
        Ok(listings)
    }

    async fn insert(&self, showtime: &Showtime) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .showtimes
            .insert(showtime.id, showtime.clone());
        Ok(())
    }

    async fn save(&self, showtime: &Showtime) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        write_seats(&mut tables, showtime)
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        update: &ShowtimeUpdate,
    ) -> Result<Option<Showtime>, StoreError> {
        let mut tables = self.tables.write().await;
        Ok(tables.showtimes.get_mut(&id).map(|stored| {
            stored.apply(update.clone());
            stored.version += 1;
            stored.updated_at = Utc::now();
            stored.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.showtimes.remove(&id).is_some())
    }
}

#[async_trait]
impl BookingRepository for InMemoryStore {
    async fn commit(&self, showtime: &Showtime, booking: &Booking) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        write_seats(&mut tables, showtime)?;
        tables.bookings.push(booking.clone());
        Ok(())
    }

    async fn cancel(&self, showtime: Option<&Showtime>, booking_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        let position = tables
            .bookings
            .iter()
            .position(|b| b.id == booking_id && b.is_active())
            .ok_or(StoreError::VersionConflict { id: booking_id })?;

        if let Some(showtime) = showtime {
            write_seats(&mut tables, showtime)?;
        }
        tables.bookings[position].status = BookingStatus::Cancelled;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.bookings.iter().find(|b| b.id == id).cloned())
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<BookingView>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .map(|b| view(&tables, b, false))
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<BookingView>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .bookings
            .iter()
            .rev()
            .map(|b| view(&tables, b, true))
            .collect())
    }

    async fn stats(&self) -> Result<BookingStats, StoreError> {
        Ok(active_stats(self.tables.read().await.bookings.iter()))
    }

    async fn showtime_stats(&self, showtime_id: Uuid) -> Result<BookingStats, StoreError> {
        let tables = self.tables.read().await;
        Ok(active_stats(
            tables.bookings.iter().filter(|b| b.showtime_id == showtime_id),
        ))
    }
}
