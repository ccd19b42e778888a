use thiserror::Error;
use uuid::Uuid;

/// Seat grid cannot be generated from the requested dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SeatMapError {
    #[error("rows must be at least 1")]
    NoRows,

    #[error("rows must not exceed {max}, got {rows}")]
    TooManyRows { rows: u32, max: u32 },

    #[error("seatsPerRow must be at least 1")]
    NoSeatsPerRow,

    #[error("seatsPerRow must not exceed {max}, got {seats_per_row}")]
    TooManySeatsPerRow { seats_per_row: u32, max: u32 },
}

/// Failures of the persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The showtime changed since it was read.
    #[error("showtime {id} was modified concurrently")]
    VersionConflict { id: Uuid },

    #[error("duplicate record: {0}")]
    Duplicate(String),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// Outcomes of the booking transaction that the caller can branch on.
#[derive(Debug, Error)]
pub enum BookingError {
    #[error("at least one seat must be requested")]
    EmptySelection,

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("seats do not exist in this showtime: {}", .0.join(", "))]
    InvalidSeat(Vec<String>),

    #[error("seats already booked: {}", .0.join(", "))]
    SeatUnavailable(Vec<String>),

    /// Retries were exhausted while other requests kept changing the showtime.
    #[error("showtime is being modified by another request, retry")]
    ConcurrencyConflict,

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(Uuid),

    #[error("booking does not belong to the current user")]
    Forbidden,

    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::VersionConflict { .. } => BookingError::ConcurrencyConflict,
            other => BookingError::Store(other),
        }
    }
}

/// Failures of movie and showtime administration.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error(transparent)]
    SeatMap(#[from] SeatMapError),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
