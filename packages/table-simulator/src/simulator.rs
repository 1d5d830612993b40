//! In-memory game driver built on the real room state machine.

use std::time::{Duration, Instant};

use landlord_backend::domain::rules::PLAYERS;
use landlord_backend::domain::scoring::GameOutcome;
use landlord_backend::domain::state::Phase;
use landlord_backend::domain::tricks::smallest_beating_play;
use landlord_backend::domain::{Card, ComboKind, Rank};
use landlord_backend::protocol::{OutboundEvent, RoomEvent};
use landlord_backend::services::{Room, RoomSettings};
use landlord_backend::DomainError;
use tracing::debug;

use crate::types::Strategy;

const USERS: [&str; PLAYERS] = ["sim-0", "sim-1", "sim-2"];
const STEP_LIMIT: usize = 1_000;

#[derive(Debug, Clone)]
pub struct GameResult {
    pub outcome: GameOutcome,
    pub forced_landlord: bool,
    pub redeals: u8,
    pub plays: u32,
    pub passes: u32,
    pub bombs: u32,
    pub tricks: u16,
}

pub struct Simulator {
    room_seed: u64,
    max_redeals: u8,
}

impl Simulator {
    pub fn new(room_seed: u64, max_redeals: u8) -> Self {
        Self {
            room_seed,
            max_redeals,
        }
    }

    /// Play one complete game with the given per-seat strategies.
    pub fn simulate_game(&self, strategies: &[Strategy; PLAYERS]) -> Result<GameResult, DomainError> {
        let settings = RoomSettings {
            turn_timeout: None,
            abandon_timeout: Duration::from_secs(60),
            max_redeals: self.max_redeals,
        };
        let now = Instant::now();
        let mut room = Room::new(1, self.room_seed, settings);
        for (seat, user) in USERS.iter().enumerate() {
            room.join(user, &format!("Seat {seat}"))?;
            room.set_ready(user, true)?;
        }
        let mut events = room.start(now)?;

        for _ in 0..STEP_LIMIT {
            let Some(game) = room.game() else { break };
            if game.phase == Phase::Finished {
                break;
            }
            let phase = game.phase;
            let Some(seat) = game.turn else { break };
            let user = USERS[seat as usize];
            let strategy = strategies[seat as usize];
            let hand = game.hand(seat).to_vec();
            let prior = game.last_play().map(|(_, c)| c.clone());

            let step = match phase {
                Phase::Bidding if wants_landlord(strategy, &hand) => room.grab(user, now)?,
                Phase::Bidding => room.pass(user, now)?,
                _ => match choose_play(strategy, &hand, prior.is_some(), || {
                    smallest_beating_play(&hand, prior.as_ref())
                }) {
                    Some(cards) => room.play(user, &cards, now)?,
                    None => room.pass(user, now)?,
                },
            };
            debug!(seat, events = step.len(), "simulated step");
            events.extend(step);
        }

        let game = room.game().ok_or_else(|| {
            DomainError::validation_other("simulated room lost its game")
        })?;
        let outcome = room
            .last_result()
            .cloned()
            .ok_or_else(|| DomainError::validation_other("game did not finish"))?;
        Ok(summarize(&events, outcome, game.bidding.redeals, game.trick_no))
    }
}

/// Bombs, the rocket and high cards make a hand worth grabbing.
fn hand_strength(hand: &[Card]) -> u32 {
    let mut counts = [0u8; 18];
    for card in hand {
        counts[card.rank.value() as usize] += 1;
    }
    let bombs = counts.iter().filter(|&&n| n == 4).count() as u32;
    let rocket = counts[Rank::SmallJoker.value() as usize] == 1
        && counts[Rank::BigJoker.value() as usize] == 1;
    let high = hand.iter().filter(|c| c.rank >= Rank::Ace).count() as u32;
    bombs * 3 + u32::from(rocket) * 3 + high
}

fn wants_landlord(strategy: Strategy, hand: &[Card]) -> bool {
    match strategy {
        Strategy::Eager => true,
        Strategy::Cautious => hand_strength(hand) >= 6,
        Strategy::Passive => false,
    }
}

fn choose_play(
    strategy: Strategy,
    hand: &[Card],
    following: bool,
    cheapest: impl FnOnce() -> Option<Vec<Card>>,
) -> Option<Vec<Card>> {
    match strategy {
        Strategy::Passive if following => None,
        Strategy::Passive => hand.first().map(|c| vec![*c]),
        Strategy::Eager | Strategy::Cautious => cheapest(),
    }
}

fn summarize(events: &[OutboundEvent], outcome: GameOutcome, redeals: u8, tricks: u16) -> GameResult {
    let mut result = GameResult {
        outcome,
        forced_landlord: false,
        redeals,
        plays: 0,
        passes: 0,
        bombs: 0,
        tricks,
    };
    for e in events {
        match &e.event {
            RoomEvent::CardsPlayed {
                combination_kind, ..
            } => {
                result.plays += 1;
                if matches!(combination_kind, ComboKind::Bomb | ComboKind::Rocket) {
                    result.bombs += 1;
                }
            }
            RoomEvent::TurnPassed { .. } => result.passes += 1,
            RoomEvent::LandlordSelected { forced, .. } => result.forced_landlord = *forced,
            _ => {}
        }
    }
    result
}
