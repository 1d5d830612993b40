//! Deterministic card dealing logic.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use super::cards_types::{Card, Rank, Suit};
use super::rules::{BOTTOM_SIZE, DECK_SIZE, HAND_SIZE, PLAYERS};

/// Result of one deal: three sorted hands plus the face-down bottom cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deal {
    pub hands: [Vec<Card>; PLAYERS],
    pub bottom: Vec<Card>,
}

/// The 54-card deck in canonical order (suit-major, then the two jokers).
pub fn full_deck() -> Vec<Card> {
    let mut deck = Vec::with_capacity(DECK_SIZE);
    for suit in Suit::ALL {
        for rank in Rank::SUITED {
            deck.push(Card::new(rank, suit));
        }
    }
    deck.push(Card::SMALL_JOKER);
    deck.push(Card::BIG_JOKER);
    deck
}

/// Fisher-Yates shuffle driven by a seeded ChaCha stream.
fn shuffle_with_seed(deck: &mut [Card], seed: u64) {
    let mut rng = ChaCha20Rng::seed_from_u64(seed);
    deck.shuffle(&mut rng);
}

/// Shuffle a fresh deck and deal it in blocks: cards `[0..17]` to seat 0,
/// `[17..34]` to seat 1, `[34..51]` to seat 2 and the last three to the
/// bottom. Hands are sorted for convenience.
///
/// Same seed, same deal.
pub fn deal(seed: u64) -> Deal {
    let mut deck = full_deck();
    shuffle_with_seed(&mut deck, seed);

    let mut hands: [Vec<Card>; PLAYERS] = Default::default();
    for (seat, hand_slot) in hands.iter_mut().enumerate() {
        let start = seat * HAND_SIZE;
        let mut hand = deck[start..start + HAND_SIZE].to_vec();
        hand.sort();
        *hand_slot = hand;
    }
    let mut bottom = deck[PLAYERS * HAND_SIZE..].to_vec();
    bottom.sort();
    debug_assert_eq!(bottom.len(), BOTTOM_SIZE);

    Deal { hands, bottom }
}
