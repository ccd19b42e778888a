#[cfg(feature = "analytics")]
pub mod analytics;
pub mod bookings;
pub mod error;
pub mod extract;
pub mod movies;
pub mod showtimes;

use axum::Router;
use std::sync::Arc;

pub use error::ApiError;
pub use extract::{ApiJson, ApiPath};

pub fn routes() -> Router<Arc<crate::AppState>> {
    let router = Router::new()
        .merge(movies::routes())
        .merge(showtimes::routes())
        .merge(bookings::routes());

    #[cfg(feature = "analytics")]
    let router = router.merge(analytics::routes());

    router
}
