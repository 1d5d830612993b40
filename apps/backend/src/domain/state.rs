use serde::Serialize;

use crate::domain::cards_types::Card;
use crate::domain::combination::Combination;
use crate::domain::dealing::deal;
use crate::domain::rules::{Seat, PLAYERS};
use crate::domain::seed_derivation::derive_dealing_seed;

/// Phases of a single game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    /// Seats take turns grabbing or declining the landlord role.
    Bidding,
    /// Landlord chosen; tricks are being played.
    Tricks,
    /// Some hand reached zero cards.
    Finished,
}

/// One entry of the trick history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TrickAction {
    Play(Combination),
    Pass,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrickEntry {
    pub seat: Seat,
    /// 1-based trick number this entry belongs to.
    pub trick_no: u16,
    #[serde(flatten)]
    pub action: TrickAction,
}

/// Bidding bookkeeping. Lives on after bidding resolves so scoring can read
/// the decline count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BiddingState {
    /// Seat that opened the current bidding round.
    pub first_bidder: Seat,
    pub declines_this_round: u8,
    /// Declines across every round; this is the game's bid count.
    pub total_declines: u8,
    pub redeals: u8,
}

/// Everything the pure rule functions need about one game.
#[derive(Debug, Clone)]
pub struct GameState {
    pub phase: Phase,
    pub hands: [Vec<Card>; PLAYERS],
    /// Bottom cards. Stay recorded after the landlord takes them so they can
    /// be shown face up.
    pub bottom: Vec<Card>,
    /// Seat expected to act; `None` once the game is finished.
    pub turn: Option<Seat>,
    pub landlord: Option<Seat>,
    /// Current trick number (1-based); 0 during bidding.
    pub trick_no: u16,
    pub trick_history: Vec<TrickEntry>,
    pub bidding: BiddingState,
    pub winner: Option<Seat>,
    pub room_seed: u64,
    pub game_no: u32,
}

impl GameState {
    /// Deal a fresh game; `first_bidder` opens bidding.
    pub fn new(room_seed: u64, game_no: u32, first_bidder: Seat) -> Self {
        let d = deal(derive_dealing_seed(room_seed, game_no, 0));
        Self {
            phase: Phase::Bidding,
            hands: d.hands,
            bottom: d.bottom,
            turn: Some(first_bidder),
            landlord: None,
            trick_no: 0,
            trick_history: Vec::new(),
            bidding: BiddingState {
                first_bidder,
                declines_this_round: 0,
                total_declines: 0,
                redeals: 0,
            },
            winner: None,
            room_seed,
            game_no,
        }
    }

    /// Seed of the deal currently on the table.
    pub fn deal_seed(&self) -> u64 {
        derive_dealing_seed(self.room_seed, self.game_no, self.bidding.redeals)
    }

    pub fn hand(&self, seat: Seat) -> &[Card] {
        &self.hands[seat as usize]
    }

    pub fn hand_sizes(&self) -> [usize; PLAYERS] {
        [self.hands[0].len(), self.hands[1].len(), self.hands[2].len()]
    }

    /// Number of declines before the landlord was chosen.
    pub fn bid_count(&self) -> u8 {
        self.bidding.total_declines
    }

    /// Entries of the trick still in progress.
    pub fn open_trick(&self) -> impl Iterator<Item = &TrickEntry> {
        let trick_no = self.trick_no;
        self.trick_history
            .iter()
            .filter(move |e| e.trick_no == trick_no)
    }

    /// Most recent play in the open trick, with its seat.
    pub fn last_play(&self) -> Option<(Seat, &Combination)> {
        self.open_trick()
            .filter_map(|e| match &e.action {
                TrickAction::Play(c) => Some((e.seat, c)),
                TrickAction::Pass => None,
            })
            .last()
    }

    /// Passes since the last play in the open trick.
    pub fn trailing_passes(&self) -> usize {
        self.open_trick()
            .collect::<Vec<_>>()
            .iter()
            .rev()
            .take_while(|e| matches!(e.action, TrickAction::Pass))
            .count()
    }

    /// Cards held, left in the bottom, or already played. Sums to the deck
    /// size in a consistent game.
    pub fn cards_accounted(&self) -> Vec<Card> {
        let mut all: Vec<Card> = self.hands.iter().flatten().copied().collect();
        if self.landlord.is_none() {
            all.extend(self.bottom.iter().copied());
        }
        for entry in &self.trick_history {
            if let TrickAction::Play(c) = &entry.action {
                all.extend(c.cards.iter().copied());
            }
        }
        all
    }
}
