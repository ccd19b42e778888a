use serde::{Deserialize, Serialize};

/// One seat of a showtime's seat map. The number never changes after generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    pub seat_number: String,
    pub is_booked: bool,
}

impl Seat {
    pub fn new(seat_number: impl Into<String>) -> Self {
        Self {
            seat_number: seat_number.into(),
            is_booked: false,
        }
    }
}
