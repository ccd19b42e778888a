//! Runs against a live Redis. Point `REDIS_URL` at a scratch instance and run
//! with `cargo test -- --ignored`.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use base64::{engine::general_purpose, Engine as _};
use chrono::{NaiveDate, NaiveTime};
use serde_json::{json, Value};
use tower::ServiceExt;

use cinema_booking::cache::CacheService;
use cinema_booking::models::Role;
use cinema_booking::redis_client::RedisClient;
use cinema_booking::services::NewShowtime;
use cinema_booking::store::InMemoryStore;
use cinema_booking::{router, AppState};
use common::{movie_draft, seats, test_config, user, Fixture, PASSWORD};

async fn cache() -> CacheService {
    let url = std::env::var("REDIS_URL").expect("REDIS_URL must be set");
    let redis = RedisClient::new(&url).await.expect("redis reachable");
    CacheService::new(redis, &test_config().redis)
}

#[tokio::test]
#[ignore]
async fn older_seat_map_never_replaces_a_newer_one() {
    let cache = cache().await;
    let fixture = Fixture::new();
    let before = fixture.showtime(100.0, 2, 3).await;

    let mut after = before.clone();
    after.book_seats(&seats(&["A1"])).unwrap();
    after.version = before.version + 1;

    assert!(cache.cache_showtime(&after).await);
    // a reader that loaded the showtime before the booking finishes late
    assert!(!cache.cache_showtime(&before).await);

    let cached = cache.get_showtime(before.id).await.expect("entry cached");
    assert_eq!(cached.version, after.version);
    assert_eq!(cached.available_seats, 5);
    assert!(cached.seat("A1").unwrap().is_booked);

    cache.invalidate_showtime(before.id).await;
    assert!(cache.get_showtime(before.id).await.is_none());
}

#[tokio::test]
#[ignore]
async fn movie_list_read_before_an_edit_is_not_cached() {
    let cache = cache().await;
    let fixture = Fixture::new();
    let movie = fixture.movie().await;

    let generation = cache.movies_generation().await.expect("redis reachable");
    cache.invalidate_movies().await;
    assert!(!cache.cache_movies(&[movie.clone()], generation).await);
    assert!(cache.get_movies().await.is_none());

    let generation = cache.movies_generation().await.expect("redis reachable");
    assert!(cache.cache_movies(&[movie.clone()], generation).await);
    let cached = cache.get_movies().await.expect("list cached");
    assert_eq!(cached[0].id, movie.id);

    cache.invalidate_movies().await;
}

#[tokio::test]
#[ignore]
async fn booking_writes_the_new_seat_map_through() {
    let store = InMemoryStore::new();
    let state = AppState::with_store(test_config(), store.clone(), cache().await);
    let customer = user(&store, Role::User).await;
    let app = router(state.clone());

    let movie = state.movies.create_movie(movie_draft()).await.unwrap();
    let showtime = state
        .showtimes
        .create_showtime(NewShowtime {
            movie_id: movie.id,
            cinema_hall: "Hall 4".to_string(),
            show_date: NaiveDate::from_ymd_opt(2026, 11, 20).unwrap(),
            show_time: NaiveTime::from_hms_opt(18, 0, 0).unwrap(),
            price: 50.0,
            rows: Some(2),
            seats_per_row: Some(3),
        })
        .await
        .unwrap();
    let uri = format!("/api/showtimes/{}", showtime.id);

    let get = || Request::builder().uri(uri.as_str()).body(Body::empty()).unwrap();
    let response = app.clone().oneshot(get()).await.unwrap();
    assert_eq!(response.headers()["X-Cache"], "MISS");

    let token = general_purpose::STANDARD.encode(format!("{}:{}", customer.email, PASSWORD));
    let booking = Request::builder()
        .method(Method::POST)
        .uri("/api/bookings")
        .header(header::AUTHORIZATION, format!("Basic {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "showtimeId": showtime.id, "seats": ["B2"] }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(booking).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app.clone().oneshot(get()).await.unwrap();
    assert_eq!(response.headers()["X-Cache"], "HIT");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["data"]["availableSeats"], 5);
    assert_eq!(body["data"]["version"], showtime.version + 1);

    state.cache.invalidate_showtime(showtime.id).await;
}
