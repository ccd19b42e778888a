pub mod booking;
pub mod movie;
pub mod seat;
pub mod showtime;
pub mod user;
pub mod views;

pub use booking::{Booking, BookingStatus};
pub use movie::{Movie, MovieDraft, MovieStatus};
pub use seat::Seat;
pub use showtime::{Showtime, ShowtimeUpdate};
pub use user::{Role, User};
pub use views::{
    BookingStats, BookingView, MovieSummary, ShowtimeAnalytics, ShowtimeListing, ShowtimeSummary,
    UserSummary,
};
