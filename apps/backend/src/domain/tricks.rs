//! Trick play: playing combinations, passing, and the fallback action used
//! for seats that cannot act themselves.

use std::collections::HashSet;

use crate::domain::cards_types::{Card, Rank};
use crate::domain::combination::{classify, ComboKind, Combination};
use crate::domain::comparison::{beats, can_follow};
use crate::domain::rules::{next_seat, Seat, PLAYERS};
use crate::domain::state::{GameState, Phase, TrickAction, TrickEntry};
use crate::errors::domain::{DomainError, ValidationKind};

/// Result of a successful play.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayResult {
    pub combination: Combination,
    /// Cards left in the player's hand.
    pub remaining: usize,
    /// The play emptied the hand and ended the game.
    pub finished: bool,
}

/// Result of a successful pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassResult {
    /// Two consecutive passes closed the trick.
    pub trick_closed: bool,
    /// Seat to act next (the new leader when the trick closed).
    pub next: Seat,
}

/// What an absent or timed-out seat does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoAction {
    Decline,
    Pass,
    Play(Vec<Card>),
}

fn ensure_trick_turn(state: &GameState, seat: Seat) -> Result<(), DomainError> {
    match state.phase {
        Phase::Bidding => {
            return Err(DomainError::validation(
                ValidationKind::BiddingInProgress,
                "Landlord not chosen yet",
            ))
        }
        Phase::Finished => {
            return Err(DomainError::validation(
                ValidationKind::GameNotStarted,
                "Game is over",
            ))
        }
        Phase::Tricks => {}
    }
    if state.turn != Some(seat) {
        return Err(DomainError::validation(
            ValidationKind::NotYourTurn,
            format!("Seat {seat} may not act now"),
        ));
    }
    Ok(())
}

/// Play `cards` from `seat`'s hand.
///
/// Every check runs before anything changes, so a rejected play leaves the
/// state untouched.
pub fn play_cards(
    state: &mut GameState,
    seat: Seat,
    cards: &[Card],
) -> Result<PlayResult, DomainError> {
    ensure_trick_turn(state, seat)?;

    if cards.is_empty() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCombination,
            "Empty play",
        ));
    }
    let distinct: HashSet<&Card> = cards.iter().collect();
    if distinct.len() != cards.len() {
        return Err(DomainError::validation(
            ValidationKind::InvalidCombination,
            "The same card appears twice",
        ));
    }

    let hand = state.hand(seat);
    if let Some(missing) = cards.iter().find(|c| !hand.contains(c)) {
        return Err(DomainError::validation(
            ValidationKind::CardsNotOwned,
            format!("Card {missing} is not in hand"),
        ));
    }

    let combination = classify(cards)?;

    if let Some((_, prior)) = state.last_play() {
        if !beats(&combination, prior) {
            return Err(DomainError::validation(
                ValidationKind::CombinationTooSmall,
                format!("{:?} does not beat {:?}", combination.kind, prior.kind),
            ));
        }
    }

    let hand = &mut state.hands[seat as usize];
    hand.retain(|c| !distinct.contains(c));
    let remaining = hand.len();

    state.trick_history.push(TrickEntry {
        seat,
        trick_no: state.trick_no,
        action: TrickAction::Play(combination.clone()),
    });

    let finished = remaining == 0;
    if finished {
        state.phase = Phase::Finished;
        state.winner = Some(seat);
        state.turn = None;
    } else {
        state.turn = Some(next_seat(seat));
    }

    Ok(PlayResult {
        combination,
        remaining,
        finished,
    })
}

/// Pass on the open trick. Not allowed for the trick leader.
pub fn pass_turn(state: &mut GameState, seat: Seat) -> Result<PassResult, DomainError> {
    ensure_trick_turn(state, seat)?;

    let leader = match state.last_play() {
        Some((leader, _)) => leader,
        None => {
            return Err(DomainError::validation(
                ValidationKind::CannotPassAsLeader,
                "The trick leader must play",
            ))
        }
    };

    state.trick_history.push(TrickEntry {
        seat,
        trick_no: state.trick_no,
        action: TrickAction::Pass,
    });

    if state.trailing_passes() >= PLAYERS - 1 {
        state.trick_no += 1;
        state.turn = Some(leader);
        return Ok(PassResult {
            trick_closed: true,
            next: leader,
        });
    }

    let next = next_seat(seat);
    state.turn = Some(next);
    Ok(PassResult {
        trick_closed: false,
        next,
    })
}

/// Fixed fallback for a seat that is not acting itself: decline while
/// bidding, pass when allowed, otherwise lead the lowest single card.
pub fn autopilot_action(state: &GameState, seat: Seat) -> Option<AutoAction> {
    match state.phase {
        Phase::Bidding => Some(AutoAction::Decline),
        Phase::Finished => None,
        Phase::Tricks => {
            if state.last_play().is_some() {
                Some(AutoAction::Pass)
            } else {
                state
                    .hand(seat)
                    .iter()
                    .min()
                    .map(|c| AutoAction::Play(vec![*c]))
            }
        }
    }
}

fn rank_groups(hand: &[Card]) -> Vec<(Rank, Vec<Card>)> {
    let mut groups: Vec<(Rank, Vec<Card>)> = Vec::new();
    let mut sorted = hand.to_vec();
    sorted.sort();
    for card in sorted {
        match groups.last_mut() {
            Some((rank, cards)) if *rank == card.rank => cards.push(card),
            _ => groups.push((card.rank, vec![card])),
        }
    }
    groups
}

fn take_run(groups: &[(Rank, Vec<Card>)], top: u8, len: u8, width: usize) -> Option<Vec<Card>> {
    let low = top.checked_sub(len.checked_sub(1)?)?;
    let mut picked = Vec::new();
    for value in low..=top {
        let rank = Rank::from_value(value)?;
        let (_, cards) = groups.iter().find(|(r, _)| *r == rank)?;
        if cards.len() < width {
            return None;
        }
        picked.extend_from_slice(&cards[..width]);
    }
    Some(picked)
}

/// Cheapest legal play from `hand` against the open trick.
///
/// Leads the lowest rank group. Follows with the lowest same-shape play for
/// singles, pairs, triples and runs, falling back to the lowest bomb and then
/// the rocket. Returns `None` when nothing found beats `prior`.
pub fn smallest_beating_play(hand: &[Card], prior: Option<&Combination>) -> Option<Vec<Card>> {
    let groups = rank_groups(hand);
    let prior = match prior {
        None => return groups.first().map(|(_, cards)| cards.clone()),
        Some(p) => p,
    };

    let mut candidates: Vec<Vec<Card>> = Vec::new();
    let above = |rank: Rank| rank > prior.primary;
    match prior.kind {
        ComboKind::Single | ComboKind::Pair | ComboKind::Triple => {
            let width = prior.cards.len();
            for (rank, cards) in &groups {
                if above(*rank) && cards.len() >= width {
                    candidates.push(cards[..width].to_vec());
                }
            }
        }
        ComboKind::Straight | ComboKind::ConsecutivePairs => {
            let width = if prior.kind == ComboKind::Straight { 1 } else { 2 };
            let len = prior.run_length.unwrap_or(0);
            for top in prior.primary_value() + 1..=Rank::Ace.value() {
                if let Some(run) = take_run(&groups, top, len, width) {
                    candidates.push(run);
                }
            }
        }
        _ => {}
    }
    for (_, cards) in &groups {
        if cards.len() == 4 {
            candidates.push(cards.clone());
        }
    }
    if hand.contains(&Card::SMALL_JOKER) && hand.contains(&Card::BIG_JOKER) {
        candidates.push(vec![Card::SMALL_JOKER, Card::BIG_JOKER]);
    }

    candidates.into_iter().find(|cards| {
        classify(cards)
            .map(|c| can_follow(&c, Some(prior)))
            .unwrap_or(false)
    })
}
