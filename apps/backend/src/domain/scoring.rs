use serde::Serialize;

use crate::domain::rules::{multiplier_for, Seat, PLAYERS};
use crate::domain::state::{GameState, Phase};

/// Final result of a finished game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameOutcome {
    pub winner_seat: Seat,
    pub landlord_seat: Seat,
    pub landlord_won: bool,
    pub bid_count: u8,
    pub multiplier: i32,
    /// Per-seat score change; sums to zero.
    pub score_delta: [i32; PLAYERS],
}

/// Score a finished game. `None` unless the game is finished with a
/// landlord and a winner.
///
/// The landlord gains or loses twice the multiplier; each farmer the
/// opposite of the multiplier.
pub fn score_game(state: &GameState) -> Option<GameOutcome> {
    if state.phase != Phase::Finished {
        return None;
    }
    let landlord = state.landlord?;
    let winner = state.winner?;

    let landlord_won = winner == landlord;
    let multiplier = multiplier_for(state.bid_count());
    let sign = if landlord_won { 1 } else { -1 };

    let mut score_delta = [0i32; PLAYERS];
    for (seat, delta) in score_delta.iter_mut().enumerate() {
        *delta = if seat as Seat == landlord {
            2 * multiplier * sign
        } else {
            -multiplier * sign
        };
    }

    Some(GameOutcome {
        winner_seat: winner,
        landlord_seat: landlord,
        landlord_won,
        bid_count: state.bid_count(),
        multiplier,
        score_delta,
    })
}
