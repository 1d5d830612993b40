//! Card-combination classification.
//!
//! `classify` turns a played set of cards into a [`Combination`]. Candidate
//! kinds are tried in a fixed priority order and the first match wins, so a
//! set that could be read two ways (e.g. four of a kind vs. triple-with-single)
//! always gets the same answer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::cards_types::{Card, Rank};
use crate::errors::domain::{DomainError, ValidationKind};

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComboKind {
    Single,
    Pair,
    Triple,
    TripleWithSingle,
    TripleWithPair,
    Straight,
    ConsecutivePairs,
    Airplane,
    AirplaneWithSingles,
    AirplaneWithPairs,
    FourWithTwo,
    Bomb,
    Rocket,
}

impl ComboKind {
    /// Run kinds only compare against runs of the same length.
    pub const fn is_run(self) -> bool {
        matches!(
            self,
            ComboKind::Straight
                | ComboKind::ConsecutivePairs
                | ComboKind::Airplane
                | ComboKind::AirplaneWithSingles
                | ComboKind::AirplaneWithPairs
        )
    }
}

/// A classified play.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub kind: ComboKind,
    /// Rank of the dominant group (top of a run, the triple, the quad...).
    pub primary: Rank,
    /// The played cards, sorted.
    pub cards: Vec<Card>,
    /// Cards in a straight, pairs in a pair run, triples in an airplane.
    pub run_length: Option<u8>,
}

impl Combination {
    pub fn primary_value(&self) -> u8 {
        self.primary.value()
    }

    fn new(kind: ComboKind, primary: Rank, cards: Vec<Card>, run_length: Option<u8>) -> Self {
        Self {
            kind,
            primary,
            cards,
            run_length,
        }
    }
}

/// Per-rank card counts, indexed by rank value.
struct RankCounts {
    counts: [u8; 18],
}

impl RankCounts {
    fn of(cards: &[Card]) -> Self {
        let mut counts = [0u8; 18];
        for card in cards {
            counts[card.rank.value() as usize] += 1;
        }
        Self { counts }
    }

    fn get(&self, rank: Rank) -> u8 {
        self.counts[rank.value() as usize]
    }

    /// Ranks held exactly `n` times, ascending.
    fn ranks_with(&self, n: u8) -> Vec<Rank> {
        self.ranks_where(|c| c == n)
    }

    fn ranks_where(&self, pred: impl Fn(u8) -> bool) -> Vec<Rank> {
        (3..=17u8)
            .filter(|&v| pred(self.counts[v as usize]))
            .filter_map(Rank::from_value)
            .collect()
    }
}

/// Ascending ranks that form an unbroken run inside 3..=A.
fn is_chain(ranks: &[Rank]) -> bool {
    ranks.iter().all(|r| r.can_chain())
        && ranks
            .windows(2)
            .all(|w| w[1].value() == w[0].value() + 1)
}

fn invalid(detail: impl Into<String>) -> DomainError {
    DomainError::validation(ValidationKind::InvalidCombination, detail)
}

/// Classify a set of cards. Deterministic and side-effect free.
///
/// Fails with `INVALID_COMBINATION` for an empty set, a set containing the
/// same card twice, or any shape that matches no kind.
pub fn classify(cards: &[Card]) -> Result<Combination, DomainError> {
    if cards.is_empty() {
        return Err(invalid("Empty play"));
    }
    let distinct: HashSet<&Card> = cards.iter().collect();
    if distinct.len() != cards.len() {
        return Err(invalid("The same card appears twice"));
    }

    let mut sorted = cards.to_vec();
    sorted.sort();
    let n = sorted.len();
    let counts = RankCounts::of(&sorted);
    let singles = counts.ranks_with(1);
    let pairs = counts.ranks_with(2);
    let triples = counts.ranks_with(3);
    let quads = counts.ranks_with(4);

    // 1. Rocket
    if n == 2 && counts.get(Rank::SmallJoker) == 1 && counts.get(Rank::BigJoker) == 1 {
        return Ok(Combination::new(ComboKind::Rocket, Rank::BigJoker, sorted, None));
    }

    // 2. Bomb: exactly four of one rank, nothing else
    if n == 4 && quads.len() == 1 {
        return Ok(Combination::new(ComboKind::Bomb, quads[0], sorted, None));
    }

    // 3. Straight
    if n >= 5 && singles.len() == n && is_chain(&singles) {
        let top = singles[n - 1];
        return Ok(Combination::new(ComboKind::Straight, top, sorted, Some(n as u8)));
    }

    // 4. Consecutive pairs
    if pairs.len() >= 3 && pairs.len() * 2 == n && is_chain(&pairs) {
        let top = pairs[pairs.len() - 1];
        let len = pairs.len() as u8;
        return Ok(Combination::new(ComboKind::ConsecutivePairs, top, sorted, Some(len)));
    }

    // 5. Airplane without wings
    if triples.len() >= 2 && triples.len() * 3 == n && is_chain(&triples) {
        let top = triples[triples.len() - 1];
        let len = triples.len() as u8;
        return Ok(Combination::new(ComboKind::Airplane, top, sorted, Some(len)));
    }

    // 6. Four with two: two extra cards, or two pairs of distinct ranks
    if quads.len() == 1 && (n == 6 || (n == 8 && pairs.len() == 2)) {
        return Ok(Combination::new(ComboKind::FourWithTwo, quads[0], sorted, None));
    }

    // 7. Airplane with wings
    if let Some(combo) = classify_winged_airplane(&counts, &sorted) {
        return Ok(combo);
    }

    // 8-12. Triple/pair/single shapes
    match n {
        5 if triples.len() == 1 && pairs.len() == 1 => Ok(Combination::new(
            ComboKind::TripleWithPair,
            triples[0],
            sorted,
            None,
        )),
        4 if triples.len() == 1 && singles.len() == 1 => Ok(Combination::new(
            ComboKind::TripleWithSingle,
            triples[0],
            sorted,
            None,
        )),
        3 if triples.len() == 1 => Ok(Combination::new(ComboKind::Triple, triples[0], sorted, None)),
        2 if pairs.len() == 1 => Ok(Combination::new(ComboKind::Pair, pairs[0], sorted, None)),
        1 => {
            let rank = sorted[0].rank;
            Ok(Combination::new(ComboKind::Single, rank, sorted, None))
        }
        _ => Err(invalid(format!("{n} cards do not form a combination"))),
    }
}

/// A run of `w >= 2` triples carrying `w` extra cards (4w total) or `w` pairs
/// (5w total). The highest qualifying run is used.
fn classify_winged_airplane(counts: &RankCounts, sorted: &[Card]) -> Option<Combination> {
    let n = sorted.len();
    let candidates = counts.ranks_where(|c| c >= 3);
    let candidates: Vec<Rank> = candidates.into_iter().filter(|r| r.can_chain()).collect();

    let shapes = [
        (ComboKind::AirplaneWithSingles, 4usize),
        (ComboKind::AirplaneWithPairs, 5usize),
    ];
    for (kind, per_triple) in shapes {
        if n % per_triple != 0 {
            continue;
        }
        let width = n / per_triple;
        if width < 2 || width > candidates.len() {
            continue;
        }
        for end in (width - 1..candidates.len()).rev() {
            let window = &candidates[end + 1 - width..=end];
            if !is_chain(window) {
                continue;
            }
            let mut rest = counts.counts;
            for rank in window {
                rest[rank.value() as usize] -= 3;
            }
            let wings_ok = match kind {
                ComboKind::AirplaneWithPairs => rest.iter().all(|c| c % 2 == 0),
                _ => true,
            };
            if wings_ok {
                return Some(Combination::new(
                    kind,
                    window[width - 1],
                    sorted.to_vec(),
                    Some(width as u8),
                ));
            }
        }
    }
    None
}
