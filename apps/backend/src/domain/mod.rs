//! Domain layer: pure game logic types and helpers.

pub mod bidding;
pub mod cards_parsing;
pub mod cards_serde;
pub mod cards_types;
pub mod combination;
pub mod comparison;
pub mod dealing;
pub mod rules;
pub mod scoring;
pub mod seed_derivation;
pub mod snapshot;
pub mod state;
pub mod tricks;

#[cfg(test)]
mod test_prelude;
#[cfg(test)]
mod tests_props_combination;

// Re-exports for ergonomics
pub use cards_parsing::{parse_hand, try_parse_cards};
pub use cards_types::{Card, Rank, Suit};
pub use combination::{classify, ComboKind, Combination};
pub use comparison::{beats, compare};
pub use dealing::{deal, full_deck, Deal};
pub use rules::Seat;
pub use scoring::GameOutcome;
pub use seed_derivation::derive_dealing_seed;
pub use state::{GameState, Phase};
