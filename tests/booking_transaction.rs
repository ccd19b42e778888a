mod common;

use cinema_booking::error::BookingError;
use cinema_booking::models::{BookingStatus, Showtime, ShowtimeUpdate};
use cinema_booking::store::ShowtimeRepository;
use common::{seats, Fixture};
use uuid::Uuid;

fn booked(showtime: &Showtime) -> Vec<&str> {
    showtime
        .seats
        .iter()
        .filter(|s| s.is_booked)
        .map(|s| s.seat_number.as_str())
        .collect()
}

#[tokio::test]
async fn books_requested_seats_and_prices_them() {
    let fx = Fixture::new();
    let showtime = fx.showtime(500.0, 3, 4).await;
    let user_id = Uuid::new_v4();

    let booking = fx
        .bookings
        .create_booking(user_id, showtime.id, seats(&["A1", "A3"]))
        .await
        .unwrap();

    assert_eq!(booking.total_price, 1000.0);
    assert_eq!(booking.seats, ["A1", "A3"]);
    assert_eq!(booking.status, BookingStatus::Booked);
    assert_eq!(booking.user_id, user_id);
    assert_eq!(booking.movie_id, showtime.movie_id);

    let after = fx.reload(&showtime).await;
    assert_eq!(after.available_seats, showtime.available_seats - 2);
    assert_eq!(after.total_seats, 12);
    assert_eq!(booked(&after), ["A1", "A3"]);
    assert_eq!(after.version, showtime.version + 1);
}

#[tokio::test]
async fn unknown_seat_leaves_showtime_untouched() {
    let fx = Fixture::new();
    let showtime = fx.showtime(500.0, 2, 2).await;

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A1", "Z99"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InvalidSeat(ref s) if s == &["Z99"]));
    assert_eq!(fx.reload(&showtime).await, showtime);
    assert_eq!(fx.bookings.get_stats().await.unwrap().bookings, 0);
}

#[tokio::test]
async fn booked_seat_fails_the_whole_selection() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 2, 2).await;

    fx.bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A1"]))
        .await
        .unwrap();

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A2", "A1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::SeatUnavailable(ref s) if s == &["A1"]));

    let after = fx.reload(&showtime).await;
    assert_eq!(booked(&after), ["A1"]);
    assert_eq!(after.available_seats, 3);
}

#[tokio::test]
async fn unknown_seat_reported_before_booked_seat() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 2, 2).await;
    fx.bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["B2"]))
        .await
        .unwrap();

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["B2", "C1", "Q7"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::InvalidSeat(ref s) if s == &["C1", "Q7"]));
}

#[tokio::test]
async fn unknown_showtime_is_not_found() {
    let fx = Fixture::new();
    let missing = Uuid::new_v4();

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), missing, seats(&["A1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::NotFound { entity: "showtime", id } if id == missing));
}

#[tokio::test]
async fn empty_selection_is_rejected() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 1, 1).await;

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, vec![" ".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::EmptySelection));
}

#[tokio::test]
async fn repeated_seat_is_booked_and_charged_once() {
    let fx = Fixture::new();
    let showtime = fx.showtime(250.0, 1, 3).await;

    let booking = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A2", "A2"]))
        .await
        .unwrap();

    assert_eq!(booking.seats, ["A2"]);
    assert_eq!(booking.total_price, 250.0);
    assert_eq!(fx.reload(&showtime).await.available_seats, 2);
}

#[tokio::test]
async fn dangling_movie_leaves_seats_free() {
    let fx = Fixture::new();
    let mut orphan = fx.showtime(100.0, 1, 2).await;
    orphan.id = Uuid::new_v4();
    orphan.movie_id = Uuid::new_v4();
    ShowtimeRepository::insert(&fx.store, &orphan).await.unwrap();

    let err = fx
        .bookings
        .create_booking(Uuid::new_v4(), orphan.id, seats(&["A1"]))
        .await
        .unwrap_err();

    assert!(matches!(err, BookingError::NotFound { entity: "movie", .. }));
    assert!(booked(&fx.reload(&orphan).await).is_empty());
}

#[tokio::test]
async fn price_follows_the_current_showtime_price() {
    let fx = Fixture::new();
    let showtime = fx.showtime(500.0, 1, 4).await;

    let first = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A1"]))
        .await
        .unwrap();

    fx.showtimes
        .update_showtime(
            showtime.id,
            ShowtimeUpdate {
                price: Some(800.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let second = fx
        .bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A2", "A3"]))
        .await
        .unwrap();

    assert_eq!(first.total_price, 500.0);
    assert_eq!(second.total_price, 1600.0);
    // the schedule edit left the seat map alone
    assert_eq!(booked(&fx.reload(&showtime).await), ["A1", "A2", "A3"]);
}

#[tokio::test]
async fn cancellation_frees_seats_once() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 1, 3).await;
    let owner = Uuid::new_v4();

    let booking = fx
        .bookings
        .create_booking(owner, showtime.id, seats(&["A1", "A2"]))
        .await
        .unwrap();

    let cancelled = fx.bookings.cancel_booking(booking.id, owner, false).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);

    let after = fx.reload(&showtime).await;
    assert!(booked(&after).is_empty());
    assert_eq!(after.available_seats, 3);

    let again = fx.bookings.cancel_booking(booking.id, owner, false).await;
    assert!(matches!(again, Err(BookingError::AlreadyCancelled(id)) if id == booking.id));

    // freed seats can be booked again
    fx.bookings
        .create_booking(Uuid::new_v4(), showtime.id, seats(&["A1"]))
        .await
        .unwrap();
}

#[tokio::test]
async fn only_owner_or_admin_may_cancel() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 1, 2).await;
    let owner = Uuid::new_v4();
    let booking = fx
        .bookings
        .create_booking(owner, showtime.id, seats(&["A1"]))
        .await
        .unwrap();

    let stranger = fx
        .bookings
        .cancel_booking(booking.id, Uuid::new_v4(), false)
        .await;
    assert!(matches!(stranger, Err(BookingError::Forbidden)));

    let by_admin = fx
        .bookings
        .cancel_booking(booking.id, Uuid::new_v4(), true)
        .await
        .unwrap();
    assert_eq!(by_admin.status, BookingStatus::Cancelled);
}

#[tokio::test]
async fn booking_survives_showtime_deletion_and_can_be_cancelled() {
    let fx = Fixture::new();
    let showtime = fx.showtime(100.0, 1, 2).await;
    let owner = Uuid::new_v4();
    let booking = fx
        .bookings
        .create_booking(owner, showtime.id, seats(&["A1"]))
        .await
        .unwrap();

    fx.showtimes.delete_showtime(showtime.id).await.unwrap();

    let mine = fx.bookings.get_user_bookings(owner).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert!(mine[0].showtime.is_none());

    let cancelled = fx.bookings.cancel_booking(booking.id, owner, false).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
}
