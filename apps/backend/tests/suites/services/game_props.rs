//! Whole-game properties over random room seeds.

include!("../../common/proptest_prelude.rs");

use std::collections::HashSet;
use std::time::Instant;

use landlord_backend::domain::rules::DECK_SIZE;
use landlord_backend::domain::state::Phase;
use landlord_backend::domain::Card;
use landlord_backend::protocol::{RoomEvent, RoomStatus};
use proptest::prelude::*;

use crate::support::room_helpers::{play_out, started_room};

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: a game played to the end is zero-sum and the winner emptied
    /// their hand.
    #[test]
    fn prop_finished_games_are_zero_sum(seed in any::<u64>()) {
        let now = Instant::now();
        let mut room = started_room(seed, now);
        let events = play_out(&mut room, now);

        prop_assert_eq!(room.status(), RoomStatus::Finished);
        let game = room.game().unwrap();
        prop_assert_eq!(game.phase, Phase::Finished);
        let winner = game.winner.unwrap();
        prop_assert!(game.hand(winner).is_empty());

        let ended: Vec<[i32; 3]> = events
            .iter()
            .filter_map(|e| match &e.event {
                RoomEvent::GameEnded { score_delta, .. } => Some(*score_delta),
                _ => None,
            })
            .collect();
        prop_assert_eq!(ended.len(), 1);
        prop_assert_eq!(ended[0].iter().sum::<i32>(), 0);
    }

    /// Property: every card played came from the player's hand exactly once;
    /// hands plus played cards always make up the whole deck.
    #[test]
    fn prop_cards_are_conserved(seed in any::<u64>()) {
        let now = Instant::now();
        let mut room = started_room(seed, now);
        let events = play_out(&mut room, now);

        let game = room.game().unwrap();
        let mut seen: Vec<Card> = game.hands.iter().flatten().copied().collect();
        for e in &events {
            if let RoomEvent::CardsPlayed { cards, .. } = &e.event {
                seen.extend(cards.iter().copied());
            }
        }
        let unique: HashSet<Card> = seen.iter().copied().collect();
        prop_assert_eq!(seen.len(), DECK_SIZE);
        prop_assert_eq!(unique.len(), DECK_SIZE);
    }
}
