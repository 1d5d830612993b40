//! Combination comparison.

use std::cmp::Ordering;

use super::combination::{ComboKind, Combination};

/// Compare two classified combinations.
///
/// Returns `None` when the two cannot be compared at all (different kinds, or
/// runs of different length). Rockets beat everything; bombs beat everything
/// except rockets and higher bombs.
pub fn compare(a: &Combination, b: &Combination) -> Option<Ordering> {
    match (a.kind, b.kind) {
        // One deck holds one rocket; kept total so `compare` is symmetric.
        (ComboKind::Rocket, ComboKind::Rocket) => Some(Ordering::Equal),
        (ComboKind::Rocket, _) => Some(Ordering::Greater),
        (_, ComboKind::Rocket) => Some(Ordering::Less),
        (ComboKind::Bomb, ComboKind::Bomb) => Some(a.primary.cmp(&b.primary)),
        (ComboKind::Bomb, _) => Some(Ordering::Greater),
        (_, ComboKind::Bomb) => Some(Ordering::Less),
        (ka, kb) if ka != kb => None,
        (ka, _) if ka.is_run() && a.run_length != b.run_length => None,
        _ => Some(a.primary.cmp(&b.primary)),
    }
}

/// True when `play` may follow `prior` in the same trick.
pub fn beats(play: &Combination, prior: &Combination) -> bool {
    compare(play, prior) == Some(Ordering::Greater)
}

/// True when `play` is legal given the open trick's last play, if any.
/// A lead is always legal.
pub fn can_follow(play: &Combination, prior: Option<&Combination>) -> bool {
    match prior {
        Some(p) => beats(play, p),
        None => true,
    }
}
