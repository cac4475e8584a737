//! `riffbox generate` - produce a riff and print or save it.

use std::fs;

use anyhow::Context;
use colored::Colorize;

use riffbox_core::{format_save, generate_riff, Meter};

use crate::cli_args::GenerateArgs;

use super::load_config;

pub fn run(args: GenerateArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let meter = Meter::new(args.steps, args.base)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    let riff = generate_riff(&config, meter, seed).context("riff generation failed")?;
    let line = format_save(meter, &riff);

    if let Some(path) = &args.output {
        fs::write(path, format!("{line}\n"))
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if args.json {
        let payload = serde_json::json!({
            "seed": seed,
            "meter": { "step": meter.step, "base": meter.base },
            "riff": riff.to_string(),
            "save_line": line,
            "notes": riff.notes(),
        });
        println!("{payload}");
    } else {
        println!("{}", riff.to_string().bold());
        println!(
            "{} {}/{}   {} {}   {} {}",
            "meter".dimmed(),
            meter.step,
            meter.base,
            "seed".dimmed(),
            seed,
            "notes".dimmed(),
            riff.len()
        );
        if let Some(path) = &args.output {
            println!("{} {}", "saved to".green(), path.display());
        }
    }
    Ok(())
}
