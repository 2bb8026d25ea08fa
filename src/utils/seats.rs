use crate::entities::bus::{Seat, SeatList};

pub const SEAT_ROWS: u32 = 10;
pub const SEAT_COLUMNS: [char; 4] = ['A', 'B', 'C', 'D'];

/// Build the fixed grid embedded in every new bus: rows 1-10, columns A-D,
/// seat numbers of the form "{row}{column}", all unbooked.
pub fn generate_seat_grid() -> SeatList {
    let mut seats = Vec::with_capacity(SEAT_ROWS as usize * SEAT_COLUMNS.len());
    for row in 1..=SEAT_ROWS {
        for letter in SEAT_COLUMNS {
            seats.push(Seat {
                seat_number: format!("{}{}", row, letter),
                is_booked: false,
            });
        }
    }
    SeatList(seats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_grid_has_40_unbooked_seats() {
        let grid = generate_seat_grid();
        assert_eq!(grid.0.len(), 40);
        assert!(grid.0.iter().all(|s| !s.is_booked));
    }

    #[test]
    fn test_seat_numbers_unique_and_well_formed() {
        let grid = generate_seat_grid();
        let numbers: HashSet<_> = grid.0.iter().map(|s| s.seat_number.as_str()).collect();

        assert_eq!(numbers.len(), 40);
        assert_eq!(grid.0.first().unwrap().seat_number, "1A");
        assert_eq!(grid.0.last().unwrap().seat_number, "10D");
        assert!(numbers.contains("5C"));
    }
}
