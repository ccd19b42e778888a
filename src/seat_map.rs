//! seat_map.rs
//!
//! Builds the initial seat grid of a new showtime.
//!
//! Rows are labelled with Latin capital letters (`A`, `B`, ...), columns are
//! numbered from 1, so a seat number looks like `"C5"`. The grid is returned
//! row-major: all of row A, then all of row B, and so on.

use crate::error::SeatMapError;
use crate::models::Seat;

/// One row per letter of the alphabet.
pub const MAX_ROWS: u32 = 26;

/// Widest row a hall can have.
pub const MAX_SEATS_PER_ROW: u32 = 100;

const ROW_LABELS: &[u8; MAX_ROWS as usize] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Generates `rows * seats_per_row` free seats.
pub fn generate(rows: u32, seats_per_row: u32) -> Result<Vec<Seat>, SeatMapError> {
    if rows == 0 {
        return Err(SeatMapError::NoRows);
    }
    if rows > MAX_ROWS {
        return Err(SeatMapError::TooManyRows { rows, max: MAX_ROWS });
    }
    if seats_per_row == 0 {
        return Err(SeatMapError::NoSeatsPerRow);
    }
    if seats_per_row > MAX_SEATS_PER_ROW {
        return Err(SeatMapError::TooManySeatsPerRow {
            seats_per_row,
            max: MAX_SEATS_PER_ROW,
        });
    }

    // both factors are bounded above, so this cannot overflow
    let mut seats = Vec::with_capacity(rows as usize * seats_per_row as usize);
    for &label in &ROW_LABELS[..rows as usize] {
        let row = label as char;
        for column in 1..=seats_per_row {
            seats.push(Seat::new(format!("{row}{column}")));
        }
    }

    Ok(seats)
}
