mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tower::ServiceExt;

use cinema_booking::models::{Role, User};
use cinema_booking::router;
use common::{app_state, user, PASSWORD};

struct Api {
    app: Router,
    admin: User,
    customer: User,
}

impl Api {
    async fn new() -> Self {
        let (state, store) = app_state();
        Self {
            app: router(state),
            admin: user(&store, Role::Admin).await,
            customer: user(&store, Role::User).await,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        as_user: Option<&User>,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(user) = as_user {
            let token = general_purpose::STANDARD.encode(format!("{}:{}", user.email, PASSWORD));
            builder = builder.header(header::AUTHORIZATION, format!("Basic {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cache = response
            .headers()
            .get("X-Cache")
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, cache, json)
    }

    async fn create_showtime(&self, price: f64) -> Value {
        let (status, _, movie) = self
            .call(
                Method::POST,
                "/api/movies",
                Some(&self.admin),
                Some(json!({
                    "title": "Arrival",
                    "description": "A linguist is recruited to talk to visitors",
                    "genre": ["sci-fi"],
                    "duration": 116,
                    "releaseDate": "2026-10-01",
                    "posterUrl": "https://img.example.com/arrival.jpg",
                    "status": "now-showing"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, showtime) = self
            .call(
                Method::POST,
                "/api/showtimes",
                Some(&self.admin),
                Some(json!({
                    "movieId": movie["data"]["id"],
                    "cinemaHall": "Hall 2",
                    "showDate": "2026-11-20",
                    "showTime": "19:30",
                    "price": price,
                    "rows": 2,
                    "seatsPerRow": 3
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        showtime["data"].clone()
    }
}

#[tokio::test]
async fn health_and_root_respond() {
    let api = Api::new().await;
    let response = api
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn booking_flow_over_http() {
    let api = Api::new().await;
    let showtime = api.create_showtime(500.0).await;
    let id = showtime["id"].as_str().unwrap();
    assert_eq!(showtime["totalSeats"], 6);
    assert_eq!(showtime["availableSeats"], 6);

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": id, "seats": ["A1", "A3"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["totalPrice"], 1000.0);
    assert_eq!(body["data"]["status"], "Booked");

    let (status, _, body) = api
        .call(Method::GET, &format!("/api/showtimes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["availableSeats"], 4);

    let (status, _, body) = api
        .call(Method::GET, "/api/bookings/me", Some(&api.customer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["movie"]["title"], "Arrival");
}

#[tokio::test]
async fn seat_errors_map_to_status_codes() {
    let api = Api::new().await;
    let showtime = api.create_showtime(100.0).await;
    let id = showtime["id"].as_str().unwrap();

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": id, "seats": ["A1", "Z99"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_seat");
    assert_eq!(body["seats"], json!(["Z99"]));

    api.call(
        Method::POST,
        "/api/bookings",
        Some(&api.customer),
        Some(json!({ "showtimeId": id, "seats": ["B2"] })),
    )
    .await;
    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": id, "seats": ["B2"] })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "seat_unavailable");

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": uuid::Uuid::new_v4(), "seats": ["A1"] })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _, _) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": id, "seats": [] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn credentials_and_roles_are_enforced() {
    let api = Api::new().await;

    let (status, _, body) = api.call(Method::GET, "/api/bookings/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unauthorized");
    assert!(body["message"].is_string());

    let (status, _, body) = api
        .call(Method::GET, "/api/bookings/stats", Some(&api.customer), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "forbidden");

    let (status, _, body) = api
        .call(Method::GET, "/api/bookings/stats", Some(&api.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "bookings": 0, "revenue": 0.0 }));

    let mut impostor = api.customer.clone();
    impostor.email = "nobody@example.com".to_string();
    let (status, _, _) = api
        .call(Method::GET, "/api/bookings/me", Some(&impostor), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_requests_use_the_error_envelope() {
    let api = Api::new().await;

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": "not-a-uuid", "seats": ["A1"] })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_body");
    assert!(body["message"].is_string());

    let (status, _, body) = api
        .call(Method::POST, "/api/bookings", Some(&api.customer), None)
        .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "unsupported_media_type");

    let (status, _, body) = api.call(Method::GET, "/api/showtimes/xyz", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "invalid_path");
    assert!(body["message"].is_string());

    let (status, _, body) = api
        .call(Method::PATCH, "/api/bookings/42/cancel", Some(&api.customer), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_path");
}

#[tokio::test]
async fn movies_need_a_real_description_and_poster() {
    let api = Api::new().await;
    let movie = |description: &str, poster: Option<&str>| {
        let mut body = json!({
            "title": "Heat",
            "description": description,
            "duration": 170,
            "releaseDate": "2026-10-01"
        });
        if let Some(poster) = poster {
            body["posterUrl"] = json!(poster);
        }
        body
    };

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/movies",
            Some(&api.admin),
            Some(movie("Too short", Some("https://img.example.com/heat.jpg"))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("description"));

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/movies",
            Some(&api.admin),
            Some(movie("A crew of thieves plans one last job", Some(""))),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("poster"));

    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/movies",
            Some(&api.admin),
            Some(movie("A crew of thieves plans one last job", None)),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_body");

    let (status, _, _) = api
        .call(
            Method::POST,
            "/api/movies",
            Some(&api.admin),
            Some(movie(
                "A crew of thieves plans one last job",
                Some("https://img.example.com/heat.jpg"),
            )),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn cancel_endpoint_frees_seats() {
    let api = Api::new().await;
    let showtime = api.create_showtime(100.0).await;
    let id = showtime["id"].as_str().unwrap();

    let (_, _, created) = api
        .call(
            Method::POST,
            "/api/bookings",
            Some(&api.customer),
            Some(json!({ "showtimeId": id, "seats": ["A2"] })),
        )
        .await;
    let booking_id = created["data"]["id"].as_str().unwrap();

    let uri = format!("/api/bookings/{booking_id}/cancel");
    let (status, _, body) = api.call(Method::PATCH, &uri, Some(&api.customer), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "Cancelled");

    let (status, _, body) = api.call(Method::PATCH, &uri, Some(&api.customer), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_cancelled");

    let (_, _, body) = api
        .call(Method::GET, &format!("/api/showtimes/{id}"), None, None)
        .await;
    assert_eq!(body["data"]["availableSeats"], 6);
}

#[tokio::test]
async fn showtime_reads_report_cache_miss_without_redis() {
    let api = Api::new().await;
    let showtime = api.create_showtime(100.0).await;
    let id = showtime["id"].as_str().unwrap();

    let (status, cache, body) = api
        .call(Method::GET, &format!("/api/showtimes/{id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cache.as_deref(), Some("MISS"));
    assert_eq!(body["data"]["seats"].as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn invalid_showtime_payloads_are_rejected() {
    let api = Api::new().await;
    let (status, _, body) = api
        .call(
            Method::POST,
            "/api/showtimes",
            Some(&api.admin),
            Some(json!({
                "movieId": uuid::Uuid::new_v4(),
                "cinemaHall": "Hall 9",
                "showDate": "2026-11-20",
                "showTime": "20:00",
                "price": 100.0,
                "rows": 27
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (status, _, _) = api
        .call(
            Method::POST,
            "/api/showtimes",
            Some(&api.admin),
            Some(json!({
                "movieId": uuid::Uuid::new_v4(),
                "cinemaHall": "Hall 9",
                "showDate": "2026-11-20",
                "showTime": "20:00",
                "price": 100.0
            })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[cfg(feature = "analytics")]
#[tokio::test]
async fn analytics_endpoint_reports_showtime_sales() {
    let api = Api::new().await;
    let showtime = api.create_showtime(40.0).await;
    let id = showtime["id"].as_str().unwrap();

    api.call(
        Method::POST,
        "/api/bookings",
        Some(&api.customer),
        Some(json!({ "showtimeId": id, "seats": ["A1", "B1"] })),
    )
    .await;

    let (status, _, body) = api
        .call(
            Method::GET,
            &format!("/api/analytics/showtimes/{id}"),
            Some(&api.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["bookedSeats"], 2);
    assert_eq!(body["data"]["revenue"], 80.0);
}
