/// Property-based tests for classification and comparison
use std::cmp::Ordering;

use proptest::prelude::*;

use crate::domain::combination::{classify, ComboKind};
use crate::domain::comparison::{beats, compare};
use crate::domain::{test_gens, test_prelude, Card};

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    /// Property: classification ignores input order
    #[test]
    fn prop_classify_order_independent(cards in test_gens::unique_cards_up_to(10)) {
        let mut reversed = cards.clone();
        reversed.reverse();
        prop_assert_eq!(classify(&cards), classify(&reversed));
    }

    /// Property: a classified combination carries exactly the played cards
    #[test]
    fn prop_classified_cards_match_input(cards in test_gens::unique_cards_up_to(8)) {
        if let Ok(combo) = classify(&cards) {
            let mut sorted = cards.clone();
            sorted.sort();
            prop_assert_eq!(combo.cards, sorted);
        }
    }

    /// Property: every contiguous single run of 5+ is a straight topped by its highest rank
    #[test]
    fn prop_runs_are_straights(cards in test_gens::run_of(1, 5)) {
        let combo = classify(&cards).unwrap();
        prop_assert_eq!(combo.kind, ComboKind::Straight);
        prop_assert_eq!(combo.run_length, Some(cards.len() as u8));
        let top = cards.iter().map(|c| c.rank).max().unwrap();
        prop_assert_eq!(combo.primary, top);
    }

    /// Property: contiguous pair runs of 3+ are consecutive pairs
    #[test]
    fn prop_pair_runs(cards in test_gens::run_of(2, 3)) {
        prop_assert_eq!(classify(&cards).unwrap().kind, ComboKind::ConsecutivePairs);
    }

    /// Property: contiguous triple runs of 2+ are airplanes
    #[test]
    fn prop_triple_runs(cards in test_gens::run_of(3, 2)) {
        prop_assert_eq!(classify(&cards).unwrap().kind, ComboKind::Airplane);
    }

    /// Property: compare is antisymmetric
    #[test]
    fn prop_compare_antisymmetric(
        a in test_gens::unique_cards_up_to(6),
        b in test_gens::unique_cards_up_to(6),
    ) {
        if let (Ok(ca), Ok(cb)) = (classify(&a), classify(&b)) {
            prop_assert_eq!(compare(&ca, &cb), compare(&cb, &ca).map(Ordering::reverse));
        }
    }

    /// Property: the rocket beats every other valid play
    #[test]
    fn prop_rocket_beats_everything(cards in test_gens::unique_cards_up_to(8)) {
        let rocket = classify(&[Card::SMALL_JOKER, Card::BIG_JOKER]).unwrap();
        if let Ok(other) = classify(&cards) {
            if other.kind != ComboKind::Rocket {
                prop_assert!(beats(&rocket, &other));
                prop_assert!(!beats(&other, &rocket));
            }
        }
    }

    /// Property: any bomb beats any non-bomb, non-rocket play
    #[test]
    fn prop_bomb_beats_non_bombs(
        bomb in test_gens::bomb(),
        cards in test_gens::unique_cards_up_to(8),
    ) {
        let bomb = classify(&bomb).unwrap();
        prop_assert_eq!(bomb.kind, ComboKind::Bomb);
        if let Ok(other) = classify(&cards) {
            if !matches!(other.kind, ComboKind::Bomb | ComboKind::Rocket) {
                prop_assert!(beats(&bomb, &other));
            }
        }
    }
}
