//! CLI argument definitions for the riffbox command-line interface.
//!
//! All `#[derive(Parser)]` and `#[derive(Subcommand)]` types are defined
//! here, keeping `main.rs` focused on dispatch logic.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Riffbox - Constrained Random Riff Generation
#[derive(Parser)]
#[command(name = "riffbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a new riff and print its grammar line
    Generate(GenerateArgs),

    /// Loop a riff against the metronome, printing playback events
    Play(PlayArgs),

    /// Parse a saved riff and dump its notes
    Inspect(InspectArgs),
}

#[derive(Args)]
pub struct GenerateArgs {
    /// Path to a riff config JSON file (defaults to quarters only)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Beats per measure
    #[arg(long, default_value_t = 4)]
    pub steps: u32,

    /// Measure base note value (4, 8, or 16)
    #[arg(long, default_value_t = 4)]
    pub base: u32,

    /// Seed for deterministic generation (random if omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Write the save line to this file
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output machine-readable JSON (no colored output)
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct PlayArgs {
    /// Path to a saved riff (generates a fresh one if omitted)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Path to a riff config JSON file (used when generating)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Beats per measure (used when generating)
    #[arg(long, default_value_t = 4)]
    pub steps: u32,

    /// Measure base note value (used when generating)
    #[arg(long, default_value_t = 4)]
    pub base: u32,

    /// Seed for deterministic generation (random if omitted)
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// Tempo in beats per minute
    #[arg(long, default_value_t = 120.0)]
    pub bpm: f64,

    /// Stop after this many measures (loops until Ctrl-C if omitted)
    #[arg(short, long)]
    pub measures: Option<u32>,

    /// Print metronome ticks only, without per-note lines
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Args)]
pub struct InspectArgs {
    /// Path to the saved riff
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output machine-readable JSON (no colored output)
    #[arg(long)]
    pub json: bool,
}
