//! Table simulator CLI: plays seeded Landlord games in memory through the
//! room state machine and writes per-game metrics.

mod metrics;
mod output;
mod simulator;
mod types;

use std::time::Instant;

use clap::Parser;
use metrics::build_game_metrics;
use output::OutputWriter;
use simulator::{GameResult, Simulator};
use tracing::{info, warn};
use types::{OutputFormat, Strategy};

#[derive(Parser)]
#[command(name = "table-simulator")]
#[command(about = "In-memory Landlord game simulator")]
struct Args {
    /// Number of games to simulate
    #[arg(short, long, default_value = "1")]
    games: u32,

    /// Strategy for all seats (shortcut to set every seat)
    #[arg(long, conflicts_with_all = ["seat0", "seat1", "seat2"])]
    seats: Option<Strategy>,

    /// Strategy for seat 0
    #[arg(long, default_value = "cautious")]
    seat0: Strategy,

    /// Strategy for seat 1
    #[arg(long, default_value = "cautious")]
    seat1: Strategy,

    /// Strategy for seat 2
    #[arg(long, default_value = "cautious")]
    seat2: Strategy,

    /// Base seed; game N uses seed + N. Random when omitted.
    #[arg(long)]
    seed: Option<u64>,

    /// Redeals before the opening seat is forced to be landlord
    #[arg(long, default_value = "3")]
    max_redeals: u8,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Show output summary and file paths
    #[arg(long)]
    show_output: bool,

    /// Output directory for results
    #[arg(long, default_value = "./simulation-results")]
    output_dir: String,

    /// Output format
    #[arg(long, default_value = "jsonl")]
    output_format: OutputFormat,

    /// Compress output files
    #[arg(long)]
    compress: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        "debug"
    } else if args.show_output {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let strategies = match args.seats {
        Some(s) => [s; 3],
        None => [args.seat0, args.seat1, args.seat2],
    };
    if args.show_output {
        info!(games = args.games, ?strategies, "Starting table simulator");
    }

    let mut output_writer = OutputWriter::new(&args.output_dir, &args.output_format, args.compress)?;
    let base_seed = args.seed.unwrap_or_else(rand::random);

    let start = Instant::now();
    let mut results = Vec::new();
    let mut errors = 0;

    for game_num in 1..=args.games {
        let game_start = Instant::now();
        let seed = base_seed.wrapping_add(game_num as u64);
        match Simulator::new(seed, args.max_redeals).simulate_game(&strategies) {
            Ok(result) => {
                let duration_ms = game_start.elapsed().as_secs_f64() * 1000.0;
                let metrics = build_game_metrics(game_num, seed, strategies, &result, duration_ms);
                if let Err(e) = output_writer.write_game(&metrics) {
                    warn!("Failed to write metrics for game {}: {}", game_num, e);
                }
                if args.verbose {
                    info!(game_num, delta = ?result.outcome.score_delta, "Game completed");
                }
                results.push(result);
            }
            Err(e) => {
                errors += 1;
                warn!("Game {} failed: {}", game_num, e);
            }
        }
    }

    let elapsed = start.elapsed();
    let (jsonl_path, csv_path) = output_writer.output_paths();
    let jsonl_path = jsonl_path.cloned();
    let csv_path = csv_path.cloned();
    output_writer.finish()?;

    if args.show_output {
        if let Some(path) = jsonl_path {
            info!("Detailed results written to: {}", path.display());
        }
        if let Some(path) = csv_path {
            info!("Summary CSV written to: {}", path.display());
        }
        print_summary(&results, errors, elapsed, args.games);
    }

    Ok(())
}

fn print_summary(results: &[GameResult], errors: u32, elapsed: std::time::Duration, total: u32) {
    println!("\n=== Simulation Summary ===");
    println!("Games completed: {}/{}", results.len(), total);
    if errors > 0 {
        println!("Errors: {}", errors);
    }
    println!("Total time: {:?}", elapsed);
    if results.is_empty() {
        return;
    }
    println!(
        "Average time per game: {:?}",
        elapsed / results.len() as u32
    );

    let n = results.len() as f64;
    let landlord_wins = results.iter().filter(|r| r.outcome.landlord_won).count();
    let forced = results.iter().filter(|r| r.forced_landlord).count();
    let bombs: u32 = results.iter().map(|r| r.bombs).sum();
    println!(
        "Landlord win rate: {:.1}% ({} forced)",
        landlord_wins as f64 / n * 100.0,
        forced
    );
    println!("Bombs per game: {:.2}", bombs as f64 / n);

    let mut totals = [0i64; 3];
    let mut wins = [0u32; 3];
    for r in results {
        for (seat, delta) in r.outcome.score_delta.iter().enumerate() {
            totals[seat] += *delta as i64;
        }
        wins[r.outcome.winner_seat as usize] += 1;
    }

    println!("\n=== Results by Seat ===");
    for seat in 0..3 {
        println!(
            "Seat {}: total={}, avg={:.2}, went out first={} ({:.1}%)",
            seat,
            totals[seat],
            totals[seat] as f64 / n,
            wins[seat],
            wins[seat] as f64 / n * 100.0
        );
    }
}
