//! Landlord bidding: every seat in turn either grabs the landlord role or
//! declines it.

use crate::domain::dealing::deal;
use crate::domain::rules::{next_seat, Seat, PLAYERS};
use crate::domain::state::{GameState, Phase};
use crate::errors::domain::{ConflictKind, DomainError, ValidationKind};

/// Result of one bidding action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BidOutcome {
    /// `seat` became landlord. `forced` is set when the redeal limit ran out
    /// and the seat opening the last round was appointed.
    LandlordChosen { seat: Seat, forced: bool },
    /// `seat` declined; `next` is now asked.
    Declined { seat: Seat, next: Seat },
    /// Every seat declined; the deck was redealt and `first_bidder` opens the
    /// new round.
    Redeal { redeal_no: u8, first_bidder: Seat },
}

fn ensure_bidding_turn(state: &GameState, seat: Seat) -> Result<(), DomainError> {
    if state.landlord.is_some() {
        return Err(DomainError::conflict(
            ConflictKind::LandlordAlreadySet,
            "Landlord already chosen",
        ));
    }
    if state.phase != Phase::Bidding {
        return Err(DomainError::validation(
            ValidationKind::GameNotStarted,
            "Bidding is not open",
        ));
    }
    if state.turn != Some(seat) {
        return Err(DomainError::validation(
            ValidationKind::NotYourTurn,
            format!("Seat {seat} may not bid now"),
        ));
    }
    Ok(())
}

/// Make `seat` landlord: bottom cards join its hand and it leads trick 1.
fn appoint_landlord(state: &mut GameState, seat: Seat) {
    let hand = &mut state.hands[seat as usize];
    hand.extend(state.bottom.iter().copied());
    hand.sort();
    state.landlord = Some(seat);
    state.phase = Phase::Tricks;
    state.turn = Some(seat);
    state.trick_no = 1;
}

/// The current seat takes the landlord role.
pub fn grab_landlord(state: &mut GameState, seat: Seat) -> Result<BidOutcome, DomainError> {
    ensure_bidding_turn(state, seat)?;
    appoint_landlord(state, seat);
    Ok(BidOutcome::LandlordChosen {
        seat,
        forced: false,
    })
}

/// The current seat declines.
///
/// When the third seat of a round declines the deck is redealt and bidding
/// restarts one seat further round. Once `max_redeals` redeals have happened,
/// a fully declined round appoints its opening seat instead.
pub fn decline_landlord(
    state: &mut GameState,
    seat: Seat,
    max_redeals: u8,
) -> Result<BidOutcome, DomainError> {
    ensure_bidding_turn(state, seat)?;

    state.bidding.declines_this_round += 1;
    state.bidding.total_declines = state.bidding.total_declines.saturating_add(1);

    if (state.bidding.declines_this_round as usize) < PLAYERS {
        let next = next_seat(seat);
        state.turn = Some(next);
        return Ok(BidOutcome::Declined { seat, next });
    }

    if state.bidding.redeals >= max_redeals {
        let forced = state.bidding.first_bidder;
        appoint_landlord(state, forced);
        return Ok(BidOutcome::LandlordChosen {
            seat: forced,
            forced: true,
        });
    }

    state.bidding.redeals += 1;
    state.bidding.declines_this_round = 0;
    state.bidding.first_bidder = next_seat(state.bidding.first_bidder);
    let d = deal(state.deal_seed());
    state.hands = d.hands;
    state.bottom = d.bottom;
    state.turn = Some(state.bidding.first_bidder);

    Ok(BidOutcome::Redeal {
        redeal_no: state.bidding.redeals,
        first_bidder: state.bidding.first_bidder,
    })
}
