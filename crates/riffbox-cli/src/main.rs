//! Riffbox CLI - generate, inspect, and play one-measure riffs.

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;

use riffbox_cli::cli_args::{Cli, Commands};
use riffbox_cli::commands;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Play(args) => commands::play::run(args),
        Commands::Inspect(args) => commands::inspect::run(args),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}
