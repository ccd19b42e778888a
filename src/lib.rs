pub mod cache;
pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod redis_client;
pub mod seat_map;
pub mod services;
pub mod store;

use axum::{routing::get, Router};
use std::sync::Arc;
use tracing::warn;

use crate::cache::CacheService;
use crate::config::Config;
use crate::services::{BookingService, MovieService, ShowtimeService};
use crate::store::{
    BookingRepository, MovieRepository, PgStore, ShowtimeRepository, UserRepository,
};

// Shared state for the whole application
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: CacheService,
    pub users: Arc<dyn UserRepository>,
    pub movies: MovieService,
    pub showtimes: ShowtimeService,
    pub bookings: BookingService,
}

impl AppState {
    /// Connects to Postgres (running migrations) and, when configured, Redis.
    pub async fn new(config: Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database).await?;
        db.run_migrations().await?;

        let cache = match &config.redis.url {
            Some(url) => match redis_client::RedisClient::new(url).await {
                Ok(redis) => CacheService::new(redis, &config.redis),
                Err(e) => {
                    warn!("Redis unavailable ({:?}), continuing without cache", e);
                    CacheService::disabled()
                }
            },
            None => CacheService::disabled(),
        };

        Ok(Self::with_store(config, PgStore::new(db.pool), cache))
    }

    /// Wires the services over any store implementing all repositories.
    pub fn with_store<S>(config: Config, store: S, cache: CacheService) -> Arc<Self>
    where
        S: UserRepository + MovieRepository + ShowtimeRepository + BookingRepository + Clone + 'static,
    {
        let store = Arc::new(store);
        let users: Arc<dyn UserRepository> = store.clone();
        let movies: Arc<dyn MovieRepository> = store.clone();
        let showtimes: Arc<dyn ShowtimeRepository> = store.clone();
        let bookings: Arc<dyn BookingRepository> = store;

        let booking = &config.booking;
        Arc::new(Self {
            movies: MovieService::new(movies.clone()),
            showtimes: ShowtimeService::new(
                showtimes.clone(),
                movies.clone(),
                booking.default_rows,
                booking.default_seats_per_row,
            ),
            bookings: BookingService::new(showtimes, movies, bookings, booking.max_retries),
            users,
            cache,
            config,
        })
    }
}

/// Full application router: service info, health check and the `/api` tree.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(|| async { "Cinema Booking API v1.0" }))
        .route("/health", get(|| async { "OK" }))
        .nest("/api", controllers::routes())
        .with_state(state)
}
