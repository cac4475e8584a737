//! `riffbox inspect` - parse a saved riff and dump its contents.

use std::fs;

use anyhow::Context;
use colored::Colorize;

use riffbox_core::{parse_save, GroupItem, Note};

use crate::cli_args::InspectArgs;

use super::class_name;

pub fn run(args: InspectArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let line = text.lines().next().unwrap_or("");
    let (meter, riff) =
        parse_save(line).with_context(|| format!("loading {}", args.input.display()))?;

    if args.json {
        let payload = serde_json::json!({
            "meter": { "step": meter.step, "base": meter.base },
            "riff": riff.to_string(),
            "ticks": riff.ticks(),
            "notes": riff.notes(),
        });
        println!("{payload}");
        return Ok(());
    }

    println!("{}", riff.to_string().bold());
    println!(
        "{} {}/{}   {} {}   {} {}",
        "meter".dimmed(),
        meter.step,
        meter.base,
        "ticks".dimmed(),
        riff.ticks(),
        "notes".dimmed(),
        riff.len()
    );
    for (index, note) in riff.notes().iter().enumerate() {
        println!(
            "{:>3}  {:<28} {:>2} ticks  {}",
            index,
            describe(note),
            note.ticks(),
            flags(note)
        );
        if let Note::Group(group) = note {
            for (member, item) in group.notes.iter().enumerate() {
                let (label, num, dots) = match item {
                    GroupItem::Rest(r) => ("rest", r.num, r.dots),
                    GroupItem::Note(n) => {
                        (if n.accent { "accented" } else { "note" }, n.num, n.dots)
                    }
                };
                println!(
                    "     {:>3}  {} {}{}",
                    member,
                    label,
                    class_name(num),
                    ".".repeat(dots as usize)
                );
            }
        }
    }
    Ok(())
}

fn describe(note: &Note) -> String {
    match note {
        Note::Rest(r) => format!("rest {}{}", class_name(r.num), ".".repeat(r.dots as usize)),
        Note::Note(n) => format!(
            "{}{}{}",
            if n.accent { "accented " } else { "" },
            class_name(n.num),
            ".".repeat(n.dots as usize)
        ),
        Note::Group(g) => format!(
            "{}-tuplet over a {} ({} members)",
            g.tuplet,
            class_name(g.num),
            g.notes.len()
        ),
    }
}

fn flags(note: &Note) -> String {
    let layout = note.layout();
    let mut parts = Vec::new();
    if layout.on_beat {
        parts.push("beat");
    }
    if layout.first_on_group {
        parts.push("beam-start");
    }
    if layout.last_on_beat {
        parts.push("beat-end");
    }
    if layout.middle_beat {
        parts.push("half");
    }
    if layout.last_before_middle {
        parts.push("pre-half");
    }
    parts.join(" ")
}
