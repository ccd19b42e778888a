pub mod booking;
pub mod movie;
pub mod showtime;

pub use booking::BookingService;
pub use movie::MovieService;
pub use showtime::{NewShowtime, ShowtimeService};
