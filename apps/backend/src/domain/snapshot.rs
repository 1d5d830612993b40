//! Public snapshot API for observing game state without exposing internals.

use serde::Serialize;

use crate::domain::cards_types::Card;
use crate::domain::combination::ComboKind;
use crate::domain::rules::{Seat, PLAYERS};
use crate::domain::state::{GameState, Phase, TrickAction};

/// One entry of the open trick as seen by any player.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrickEntryView {
    Play {
        seat: Seat,
        kind: ComboKind,
        cards: Vec<Card>,
    },
    Pass {
        seat: Seat,
    },
}

/// A game as seen from one seat: only that seat's hand is included.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GameView {
    pub phase: Phase,
    pub turn: Option<Seat>,
    pub landlord: Option<Seat>,
    pub hand_sizes: [usize; PLAYERS],
    /// Viewer's own cards; empty for a spectator.
    pub hand: Vec<Card>,
    /// Bottom cards, once the landlord has taken them.
    pub bottom: Option<Vec<Card>>,
    pub trick_no: u16,
    pub open_trick: Vec<TrickEntryView>,
    pub bid_count: u8,
    pub winner: Option<Seat>,
}

impl GameView {
    pub fn for_seat(state: &GameState, viewer: Option<Seat>) -> Self {
        let open_trick = state
            .open_trick()
            .map(|e| match &e.action {
                TrickAction::Play(c) => TrickEntryView::Play {
                    seat: e.seat,
                    kind: c.kind,
                    cards: c.cards.clone(),
                },
                TrickAction::Pass => TrickEntryView::Pass { seat: e.seat },
            })
            .collect();

        Self {
            phase: state.phase,
            turn: state.turn,
            landlord: state.landlord,
            hand_sizes: state.hand_sizes(),
            hand: viewer
                .map(|seat| state.hand(seat).to_vec())
                .unwrap_or_default(),
            bottom: state.landlord.map(|_| state.bottom.clone()),
            trick_no: state.trick_no,
            open_trick,
            bid_count: state.bid_count(),
            winner: state.winner,
        }
    }
}
