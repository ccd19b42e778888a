use chrono::{NaiveDate, NaiveTime};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::error::CatalogError;
use crate::models::{Showtime, ShowtimeListing, ShowtimeUpdate};
use crate::seat_map;
use crate::store::{MovieRepository, ShowtimeRepository};

/// Schedule of a new screening. Missing grid dimensions fall back to the
/// configured defaults.
#[derive(Debug, Clone)]
pub struct NewShowtime {
    pub movie_id: Uuid,
    pub cinema_hall: String,
    pub show_date: NaiveDate,
    pub show_time: NaiveTime,
    pub price: f64,
    pub rows: Option<u32>,
    pub seats_per_row: Option<u32>,
}

#[derive(Clone)]
pub struct ShowtimeService {
    showtimes: Arc<dyn ShowtimeRepository>,
    movies: Arc<dyn MovieRepository>,
    default_rows: u32,
    default_seats_per_row: u32,
}

impl ShowtimeService {
    pub fn new(
        showtimes: Arc<dyn ShowtimeRepository>,
        movies: Arc<dyn MovieRepository>,
        default_rows: u32,
        default_seats_per_row: u32,
    ) -> Self {
        Self {
            showtimes,
            movies,
            default_rows,
            default_seats_per_row,
        }
    }

    /// Schedules a screening and generates its seat map.
    pub async fn create_showtime(&self, new: NewShowtime) -> Result<Showtime, CatalogError> {
        validate_price(new.price)?;
        validate_hall(&new.cinema_hall)?;

        if self.movies.find_by_id(new.movie_id).await?.is_none() {
            return Err(CatalogError::NotFound {
                entity: "movie",
                id: new.movie_id,
            });
        }

        let rows = new.rows.unwrap_or(self.default_rows);
        let seats_per_row = new.seats_per_row.unwrap_or(self.default_seats_per_row);
        let seats = seat_map::generate(rows, seats_per_row)?;

        let showtime = Showtime::new(
            new.movie_id,
            new.cinema_hall.trim().to_string(),
            new.show_date,
            new.show_time,
            new.price,
            seats,
        );
        self.showtimes.insert(&showtime).await?;

        info!(
            "Showtime {} scheduled for movie {} in {}: {}x{} seats",
            showtime.id, showtime.movie_id, showtime.cinema_hall, rows, seats_per_row
        );
        Ok(showtime)
    }

    /// Edits hall, date, time or price. The seat map is left as it is.
    pub async fn update_showtime(
        &self,
        id: Uuid,
        update: ShowtimeUpdate,
    ) -> Result<Showtime, CatalogError> {
        if let Some(price) = update.price {
            validate_price(price)?;
        }
        if let Some(hall) = &update.cinema_hall {
            validate_hall(hall)?;
        }

        self.showtimes
            .update_schedule(id, &update)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "showtime",
                id,
            })
    }

    pub async fn delete_showtime(&self, id: Uuid) -> Result<(), CatalogError> {
        if !self.showtimes.delete(id).await? {
            return Err(CatalogError::NotFound {
                entity: "showtime",
                id,
            });
        }
        info!("Showtime {} deleted", id);
        Ok(())
    }

    pub async fn get_showtime(&self, id: Uuid) -> Result<Showtime, CatalogError> {
        self.showtimes
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::NotFound {
                entity: "showtime",
                id,
            })
    }

    pub async fn list_showtimes(&self) -> Result<Vec<ShowtimeListing>, CatalogError> {
        Ok(self.showtimes.list().await?)
    }

    pub async fn showtimes_for_movie(&self, movie_id: Uuid) -> Result<Vec<Showtime>, CatalogError> {
        Ok(self.showtimes.find_by_movie(movie_id).await?)
    }
}

fn validate_price(price: f64) -> Result<(), CatalogError> {
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::Invalid("price must be a non-negative number".to_string()));
    }
    Ok(())
}

fn validate_hall(hall: &str) -> Result<(), CatalogError> {
    if hall.trim().is_empty() {
        return Err(CatalogError::Invalid("cinemaHall must not be empty".to_string()));
    }
    Ok(())
}
