#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::{Sentence, Words};
use fake::faker::name::en::Name;
use fake::Fake;
use std::sync::Arc;

use cinema_booking::cache::CacheService;
use cinema_booking::config::{
    AppConfig, BookingConfig, Config, DatabaseConfig, LogFormat, RedisConfig,
};
use cinema_booking::models::{Movie, MovieDraft, MovieStatus, Role, Showtime, User};
use cinema_booking::services::{BookingService, MovieService, NewShowtime, ShowtimeService};
use cinema_booking::store::{InMemoryStore, UserRepository};
use cinema_booking::AppState;

pub const PASSWORD: &str = "correct horse battery staple";

pub struct Fixture {
    pub store: InMemoryStore,
    pub movies: MovieService,
    pub showtimes: ShowtimeService,
    pub bookings: BookingService,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_retries(3)
    }

    pub fn with_retries(max_retries: u32) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            movies: MovieService::new(store.clone()),
            showtimes: ShowtimeService::new(store.clone(), store.clone(), 10, 10),
            bookings: BookingService::new(store.clone(), store.clone(), store.clone(), max_retries),
            store: (*store).clone(),
        }
    }

    pub async fn movie(&self) -> Movie {
        self.movies
            .create_movie(movie_draft())
            .await
            .expect("movie created")
    }

    /// Showtime of a fresh movie with a `rows` x `seats_per_row` grid.
    pub async fn showtime(&self, price: f64, rows: u32, seats_per_row: u32) -> Showtime {
        let movie = self.movie().await;
        self.showtime_for(&movie, price, rows, seats_per_row).await
    }

    pub async fn showtime_for(
        &self,
        movie: &Movie,
        price: f64,
        rows: u32,
        seats_per_row: u32,
    ) -> Showtime {
        self.showtimes
            .create_showtime(NewShowtime {
                movie_id: movie.id,
                cinema_hall: "Hall 1".to_string(),
                show_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
                show_time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
                price,
                rows: Some(rows),
                seats_per_row: Some(seats_per_row),
            })
            .await
            .expect("showtime created")
    }

    pub async fn reload(&self, showtime: &Showtime) -> Showtime {
        self.showtimes
            .get_showtime(showtime.id)
            .await
            .expect("showtime exists")
    }
}

pub fn movie_draft() -> MovieDraft {
    let title: String = Sentence(1..4).fake();
    MovieDraft {
        title,
        description: Sentence(5..12).fake(),
        genre: Words(1..3).fake(),
        duration: (80..180).fake(),
        release_date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
        poster_url: "https://img.example.com/poster.jpg".to_string(),
        trailer_url: String::new(),
        cast: vec![Name().fake(), Name().fake()],
        status: MovieStatus::NowShowing,
    }
}

pub fn seats(labels: &[&str]) -> Vec<String> {
    labels.iter().map(|s| s.to_string()).collect()
}

pub async fn user(store: &InMemoryStore, role: Role) -> User {
    let hash = bcrypt::hash(PASSWORD, 4).expect("hash");
    let user = User::new(Name().fake(), SafeEmail().fake(), hash, role);
    UserRepository::insert(store, &user).await.expect("user inserted");
    user
}

pub fn test_config() -> Config {
    Config {
        app: AppConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            rust_log: "cinema_booking=debug".to_string(),
            log_format: LogFormat::Text,
        },
        database: DatabaseConfig {
            url: "postgres://unused".to_string(),
            pool_size: 1,
            acquire_timeout_seconds: 1,
        },
        redis: RedisConfig {
            url: None,
            ttl_seconds: 60,
            showtime_ttl_seconds: 30,
        },
        booking: BookingConfig {
            max_retries: 3,
            default_rows: 10,
            default_seats_per_row: 10,
        },
    }
}

/// Application state over a fresh in-memory store, without Redis.
pub fn app_state() -> (Arc<AppState>, InMemoryStore) {
    let store = InMemoryStore::new();
    let state = AppState::with_store(test_config(), store.clone(), CacheService::disabled());
    (state, store)
}
