/// Seat index, 0..3.
pub type Seat = u8;

pub const PLAYERS: usize = 3;
pub const HAND_SIZE: usize = 17;
pub const BOTTOM_SIZE: usize = 3;
pub const DECK_SIZE: usize = 54;

/// Score multipliers indexed by bid count; counts past the table reuse the last entry.
pub const MULTIPLIERS: [i32; 3] = [1, 2, 4];

/// Seat that acts after `seat`.
pub fn next_seat(seat: Seat) -> Seat {
    (seat + 1) % PLAYERS as Seat
}

pub fn multiplier_for(bid_count: u8) -> i32 {
    let idx = (bid_count as usize).min(MULTIPLIERS.len() - 1);
    MULTIPLIERS[idx]
}

pub fn is_valid_seat(seat: Seat) -> bool {
    (seat as usize) < PLAYERS
}
