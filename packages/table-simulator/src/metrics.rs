//! Per-game metrics written by the simulator.

use serde::Serialize;

use crate::simulator::GameResult;
use crate::types::Strategy;

#[derive(Debug, Clone, Serialize)]
pub struct GameMetrics {
    pub game_id: u32,
    pub seed: u64,
    pub timestamp: String,
    pub strategies: [Strategy; 3],
    pub result: GameResultMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct GameResultMetrics {
    pub winner: u8,
    pub landlord: u8,
    pub landlord_won: bool,
    pub forced_landlord: bool,
    pub bid_count: u8,
    pub multiplier: i32,
    pub score_delta: [i32; 3],
    pub redeals: u8,
    pub tricks: u16,
    pub plays: u32,
    pub passes: u32,
    pub bombs: u32,
    pub duration_ms: f64,
}

pub fn build_game_metrics(
    game_id: u32,
    seed: u64,
    strategies: [Strategy; 3],
    result: &GameResult,
    duration_ms: f64,
) -> GameMetrics {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("unknown"));

    let o = &result.outcome;
    GameMetrics {
        game_id,
        seed,
        timestamp,
        strategies,
        result: GameResultMetrics {
            winner: o.winner_seat,
            landlord: o.landlord_seat,
            landlord_won: o.landlord_won,
            forced_landlord: result.forced_landlord,
            bid_count: o.bid_count,
            multiplier: o.multiplier,
            score_delta: o.score_delta,
            redeals: result.redeals,
            tricks: result.tricks,
            plays: result.plays,
            passes: result.passes,
            bombs: result.bombs,
            duration_ms,
        },
    }
}

/// Flat row for the CSV summary.
#[derive(Debug, Clone, Serialize)]
pub struct CsvSummaryRow {
    pub game_id: u32,
    pub seed: u64,
    pub winner: u8,
    pub landlord: u8,
    pub landlord_won: bool,
    pub multiplier: i32,
    pub seat0_delta: i32,
    pub seat1_delta: i32,
    pub seat2_delta: i32,
    pub bombs: u32,
}

impl From<&GameMetrics> for CsvSummaryRow {
    fn from(metrics: &GameMetrics) -> Self {
        let r = &metrics.result;
        CsvSummaryRow {
            game_id: metrics.game_id,
            seed: metrics.seed,
            winner: r.winner,
            landlord: r.landlord,
            landlord_won: r.landlord_won,
            multiplier: r.multiplier,
            seat0_delta: r.score_delta[0],
            seat1_delta: r.score_delta[1],
            seat2_delta: r.score_delta[2],
            bombs: r.bombs,
        }
    }
}
