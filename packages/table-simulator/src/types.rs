//! Shared types for the simulator.

use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    None,
}

/// How a simulated seat bids and plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Grabs whenever asked; always plays the cheapest beating combination.
    Eager,
    /// Grabs only with a strong hand; plays the cheapest beating combination.
    Cautious,
    /// Never grabs; passes whenever the rules allow.
    Passive,
}
