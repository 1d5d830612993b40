//! RNG seed derivation utilities for deterministic dealing.
//!
//! A room carries one base seed. Every deal in that room (each game, and each
//! redeal inside a game) gets its own seed derived from it, so a whole room's
//! history can be replayed from the base seed alone.

/// Derive the seed for one deal.
///
/// # Arguments
///
/// * `room_seed` - Base RNG seed drawn when the room was created
/// * `game_no` - Games started in this room before this one
/// * `redeal_no` - Redeals already performed in this game (0 for the first deal)
pub fn derive_dealing_seed(room_seed: u64, game_no: u32, redeal_no: u8) -> u64 {
    room_seed
        .wrapping_add((game_no as u64).wrapping_mul(1_000_000))
        .wrapping_add((redeal_no as u64).wrapping_mul(1_000))
        .wrapping_add(2)
}
