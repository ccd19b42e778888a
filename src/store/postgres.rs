use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use sqlx::{types::Json, FromRow, PgConnection, PgPool};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{
    Booking, BookingStats, BookingStatus, BookingView, Movie, MovieStatus, MovieSummary, Role,
    Seat, Showtime, ShowtimeListing, ShowtimeSummary, ShowtimeUpdate, User, UserSummary,
};
use crate::store::{BookingRepository, MovieRepository, ShowtimeRepository, UserRepository};

/// Postgres-backed implementation of every repository.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/* ---------- rows ---------- */

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            role: row.role.parse::<Role>().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct MovieRow {
    id: Uuid,
    title: String,
    description: String,
    genre: Vec<String>,
    duration: i32,
    release_date: NaiveDate,
    poster_url: String,
    trailer_url: String,
    cast_members: Vec<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MovieRow> for Movie {
    type Error = StoreError;

    fn try_from(row: MovieRow) -> Result<Self, Self::Error> {
        Ok(Movie {
            id: row.id,
            title: row.title,
            description: row.description,
            genre: row.genre,
            duration: row.duration,
            release_date: row.release_date,
            poster_url: row.poster_url,
            trailer_url: row.trailer_url,
            cast: row.cast_members,
            status: row.status.parse::<MovieStatus>().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ShowtimeRow {
    id: Uuid,
    movie_id: Uuid,
    cinema_hall: String,
    show_date: NaiveDate,
    show_time: NaiveTime,
    price: f64,
    total_seats: i32,
    available_seats: i32,
    seats: Json<Vec<Seat>>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShowtimeRow> for Showtime {
    fn from(row: ShowtimeRow) -> Self {
        Showtime {
            id: row.id,
            movie_id: row.movie_id,
            cinema_hall: row.cinema_hall,
            show_date: row.show_date,
            show_time: row.show_time,
            price: row.price,
            total_seats: row.total_seats,
            available_seats: row.available_seats,
            seats: row.seats.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ShowtimeListingRow {
    #[sqlx(flatten)]
    showtime: ShowtimeRow,
    movie_title: Option<String>,
    movie_poster_url: Option<String>,
}

#[derive(FromRow)]
struct BookingRow {
    id: Uuid,
    user_id: Uuid,
    movie_id: Uuid,
    showtime_id: Uuid,
    seats: Vec<String>,
    total_price: f64,
    status: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = StoreError;

    fn try_from(row: BookingRow) -> Result<Self, Self::Error> {
        Ok(Booking {
            id: row.id,
            user_id: row.user_id,
            movie_id: row.movie_id,
            showtime_id: row.showtime_id,
            seats: row.seats,
            total_price: row.total_price,
            status: row.status.parse::<BookingStatus>().map_err(StoreError::Corrupt)?,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct BookingViewRow {
    #[sqlx(flatten)]
    booking: BookingRow,
    movie_title: Option<String>,
    movie_poster_url: Option<String>,
    show_date: Option<NaiveDate>,
    show_time: Option<NaiveTime>,
    cinema_hall: Option<String>,
    user_name: Option<String>,
    user_email: Option<String>,
}

impl TryFrom<BookingViewRow> for BookingView {
    type Error = StoreError;

    fn try_from(row: BookingViewRow) -> Result<Self, Self::Error> {
        let movie = match (row.movie_title, row.movie_poster_url) {
            (Some(title), Some(poster_url)) => Some(MovieSummary { title, poster_url }),
            _ => None,
        };
        let showtime = match (row.show_date, row.show_time, row.cinema_hall) {
            (Some(show_date), Some(show_time), Some(cinema_hall)) => Some(ShowtimeSummary {
                show_date,
                show_time,
                cinema_hall,
            }),
            _ => None,
        };
        let user = match (row.user_name, row.user_email) {
            (Some(name), Some(email)) => Some(UserSummary { name, email }),
            _ => None,
        };

        Ok(BookingView {
            booking: row.booking.try_into()?,
            movie,
            showtime,
            user,
        })
    }
}

/* ---------- helpers ---------- */

const SHOWTIME_COLUMNS: &str = "id, movie_id, cinema_hall, show_date, show_time, price, \
     total_seats, available_seats, seats, version, created_at, updated_at";

const MOVIE_COLUMNS: &str = "id, title, description, genre, duration, release_date, \
     poster_url, trailer_url, cast_members, status, created_at, updated_at";

// Conditional seat write shared by `save`, `commit` and `cancel`.
async fn write_seats(conn: &mut PgConnection, showtime: &Showtime) -> Result<i64, StoreError> {
    let version = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE showtimes
        SET seats = $1, total_seats = $2, available_seats = $3,
            version = version + 1, updated_at = NOW()
        WHERE id = $4 AND version = $5
        RETURNING version
        "#,
    )
    .bind(Json(&showtime.seats))
    .bind(showtime.total_seats)
    .bind(showtime.available_seats)
    .bind(showtime.id)
    .bind(showtime.version)
    .fetch_optional(&mut *conn)
    .await?;

    version.ok_or(StoreError::VersionConflict { id: showtime.id })
}

fn booking_view_query(filter: &str) -> String {
    format!(
        r#"
        SELECT b.id, b.user_id, b.movie_id, b.showtime_id, b.seats, b.total_price,
               b.status, b.created_at,
               m.title AS movie_title, m.poster_url AS movie_poster_url,
               s.show_date, s.show_time, s.cinema_hall,
               u.name AS user_name, u.email AS user_email
        FROM bookings b
        LEFT JOIN movies m ON m.id = b.movie_id
        LEFT JOIN showtimes s ON s.id = b.showtime_id
        LEFT JOIN users u ON u.id = b.user_id
        {filter}
        ORDER BY b.created_at DESC, b.id
        "#
    )
}

/* ---------- USERS ---------- */

#[async_trait]
impl UserRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?
        .map(User::try_from)
        .transpose()
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, name, email, password_hash, role, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/* ---------- MOVIES ---------- */

#[async_trait]
impl MovieRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Movie>, StoreError> {
        sqlx::query_as::<_, MovieRow>(&format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Movie::try_from)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Movie>, StoreError> {
        sqlx::query_as::<_, MovieRow>(&format!(
            "SELECT {MOVIE_COLUMNS} FROM movies ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Movie::try_from)
        .collect()
    }

    async fn insert(&self, movie: &Movie) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO movies ({MOVIE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.genre)
        .bind(movie.duration)
        .bind(movie.release_date)
        .bind(&movie.poster_url)
        .bind(&movie.trailer_url)
        .bind(&movie.cast)
        .bind(movie.status.as_str())
        .bind(movie.created_at)
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, movie: &Movie) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE movies
            SET title = $2, description = $3, genre = $4, duration = $5, release_date = $6,
                poster_url = $7, trailer_url = $8, cast_members = $9, status = $10,
                updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(movie.id)
        .bind(&movie.title)
        .bind(&movie.description)
        .bind(&movie.genre)
        .bind(movie.duration)
        .bind(movie.release_date)
        .bind(&movie.poster_url)
        .bind(&movie.trailer_url)
        .bind(&movie.cast)
        .bind(movie.status.as_str())
        .bind(movie.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        // showtimes go with it via ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/* ---------- SHOWTIMES ---------- */

#[async_trait]
impl ShowtimeRepository for PgStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Showtime>, StoreError> {
        let row = sqlx::query_as::<_, ShowtimeRow>(&format!(
            "SELECT {SHOWTIME_COLUMNS} FROM showtimes WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Showtime::from))
    }

    async fn find_by_movie(&self, movie_id: Uuid) -> Result<Vec<Showtime>, StoreError> {
        let rows = sqlx::query_as::<_, ShowtimeRow>(&format!(
            "SELECT {SHOWTIME_COLUMNS} FROM showtimes WHERE movie_id = $1
             ORDER BY show_date, show_time"
        ))
        .bind(movie_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Showtime::from).collect())
    }

    async fn list(&self) -> Result<Vec<ShowtimeListing>, StoreError> {
        let rows = sqlx::query_as::<_, ShowtimeListingRow>(
            r#"
            SELECT s.id, s.movie_id, s.cinema_hall, s.show_date, s.show_time, s.price,
                   s.total_seats, s.available_seats, s.seats, s.version,
                   s.created_at, s.updated_at,
                   m.title AS movie_title, m.poster_url AS movie_poster_url
            FROM showtimes s
            LEFT JOIN movies m ON m.id = s.movie_id
            ORDER BY s.show_date, s.show_time
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let movie = match (row.movie_title, row.movie_poster_url) {
                    (Some(title), Some(poster_url)) => Some(MovieSummary { title, poster_url }),
                    _ => None,
                };
                ShowtimeListing {
                    showtime: row.showtime.into(),
                    movie,
                }
            })
            .collect())
    }

    async fn insert(&self, showtime: &Showtime) -> Result<(), StoreError> {
        sqlx::query(&format!(
            "INSERT INTO showtimes ({SHOWTIME_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)"
        ))
        .bind(showtime.id)
        .bind(showtime.movie_id)
        .bind(&showtime.cinema_hall)
        .bind(showtime.show_date)
        .bind(showtime.show_time)
        .bind(showtime.price)
        .bind(showtime.total_seats)
        .bind(showtime.available_seats)
        .bind(Json(&showtime.seats))
        .bind(showtime.version)
        .bind(showtime.created_at)
        .bind(showtime.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn save(&self, showtime: &Showtime) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        write_seats(&mut *conn, showtime).await
    }

    async fn update_schedule(
        &self,
        id: Uuid,
        update: &ShowtimeUpdate,
    ) -> Result<Option<Showtime>, StoreError> {
        let row = sqlx::query_as::<_, ShowtimeRow>(&format!(
            r#"
            UPDATE showtimes
            SET cinema_hall = COALESCE($2, cinema_hall),
                show_date = COALESCE($3, show_date),
                show_time = COALESCE($4, show_time),
                price = COALESCE($5, price),
                version = version + 1,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {SHOWTIME_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(update.cinema_hall.as_deref())
        .bind(update.show_date)
        .bind(update.show_time)
        .bind(update.price)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Showtime::from))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM showtimes WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/* ---------- BOOKINGS ---------- */

#[async_trait]
impl BookingRepository for PgStore {
    async fn commit(&self, showtime: &Showtime, booking: &Booking) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // 1) seats, only if nobody wrote the showtime since we read it
        if let Err(e) = write_seats(&mut *tx, showtime).await {
            let _ = tx.rollback().await;
            return Err(e);
        }

        // 2) the booking itself
        sqlx::query(
            r#"
            INSERT INTO bookings (id, user_id, movie_id, showtime_id, seats, total_price, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(booking.id)
        .bind(booking.user_id)
        .bind(booking.movie_id)
        .bind(booking.showtime_id)
        .bind(&booking.seats)
        .bind(booking.total_price)
        .bind(booking.status.as_str())
        .bind(booking.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        debug!("Committed booking {} on showtime {}", booking.id, showtime.id);
        Ok(())
    }

    async fn cancel(&self, showtime: Option<&Showtime>, booking_id: Uuid) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        if let Some(showtime) = showtime {
            if let Err(e) = write_seats(&mut *tx, showtime).await {
                let _ = tx.rollback().await;
                return Err(e);
            }
        }

        let result = sqlx::query(
            "UPDATE bookings SET status = 'Cancelled' WHERE id = $1 AND status = 'Booked'",
        )
        .bind(booking_id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            warn!("Booking {} changed status while cancelling", booking_id);
            let _ = tx.rollback().await;
            return Err(StoreError::VersionConflict { id: booking_id });
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Booking>, StoreError> {
        sqlx::query_as::<_, BookingRow>(
            "SELECT id, user_id, movie_id, showtime_id, seats, total_price, status, created_at
             FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Booking::try_from)
        .transpose()
    }

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<BookingView>, StoreError> {
        let rows = sqlx::query_as::<_, BookingViewRow>(&booking_view_query("WHERE b.user_id = $1"))
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter()
            .map(|row| {
                // the owner does not need their own name echoed back
                BookingView::try_from(row).map(|view| BookingView { user: None, ..view })
            })
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<BookingView>, StoreError> {
        sqlx::query_as::<_, BookingViewRow>(&booking_view_query(""))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(BookingView::try_from)
            .collect()
    }

    async fn stats(&self) -> Result<BookingStats, StoreError> {
        let (bookings, revenue) = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'Booked') AS bookings,
                COALESCE(SUM(total_price) FILTER (WHERE status = 'Booked'), 0)::float8 AS revenue
            FROM bookings
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(BookingStats { bookings, revenue })
    }

    async fn showtime_stats(&self, showtime_id: Uuid) -> Result<BookingStats, StoreError> {
        let (bookings, revenue) = sqlx::query_as::<_, (i64, f64)>(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'Booked') AS bookings,
                COALESCE(SUM(total_price) FILTER (WHERE status = 'Booked'), 0)::float8 AS revenue
            FROM bookings
            WHERE showtime_id = $1
            "#,
        )
        .bind(showtime_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(BookingStats { bookings, revenue })
    }
}
