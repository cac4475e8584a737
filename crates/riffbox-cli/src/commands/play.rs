//! `riffbox play` - loop a riff against the metronome, printing events.
//!
//! This command is the terminal stand-in for the audio collaborator: every
//! scheduler event becomes a printed line instead of a sample trigger.

use std::fs;

use anyhow::Context;
use colored::Colorize;
use tokio::sync::mpsc;

use riffbox_core::{format_save, generate_riff, parse_save, GroupItem, Meter, Note, Riff};
use riffbox_playback::{NoteRef, PlaybackSink, Player, Tick};

use crate::cli_args::PlayArgs;

use super::{class_name, load_config};

pub fn run(args: PlayArgs) -> anyhow::Result<()> {
    let (meter, riff, seed) = if let Some(path) = &args.input {
        let text =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let line = text.lines().next().unwrap_or("");
        let (meter, riff) =
            parse_save(line).with_context(|| format!("loading {}", path.display()))?;
        (meter, riff, None)
    } else {
        let config = load_config(args.config.as_deref())?;
        let meter = Meter::new(args.steps, args.base)?;
        let seed = args.seed.unwrap_or_else(rand::random);
        let riff = generate_riff(&config, meter, seed).context("riff generation failed")?;
        (meter, riff, Some(seed))
    };

    println!("{}", format_save(meter, &riff).bold());
    if let Some(seed) = seed {
        println!("{} {}", "seed".dimmed(), seed);
    }
    println!(
        "{} {:.0} BPM, {}/{} - Ctrl-C to stop",
        "playing".green().bold(),
        args.bpm,
        meter.step,
        meter.base
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting the async runtime")?;
    runtime.block_on(async {
        let (done_tx, mut done_rx) = mpsc::unbounded_channel();
        let sink = TerminalSink {
            riff: riff.clone(),
            quiet: args.quiet,
            measures: args.measures,
            done: done_tx,
        };
        let player = Player::start(&riff, args.bpm, meter, sink)?;
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = done_rx.recv() => {}
        }
        player.stop();
        player.stopped().await;
        anyhow::Ok(())
    })?;
    println!("{}", "stopped".yellow());
    Ok(())
}

struct TerminalSink {
    riff: Riff,
    quiet: bool,
    measures: Option<u32>,
    done: mpsc::UnboundedSender<()>,
}

impl PlaybackSink for TerminalSink {
    fn on_note_active(&mut self, note: NoteRef) {
        if self.quiet {
            return;
        }
        println!("      {}", describe_ref(&self.riff, note).cyan());
    }

    fn on_tick(&mut self, tick: Tick) {
        if let Some(limit) = self.measures {
            if tick.measure >= limit {
                let _ = self.done.send(());
                return;
            }
        }
        if tick.measure_start {
            println!(
                "{} measure {}",
                "TICK".green().bold(),
                tick.measure + 1
            );
        } else {
            println!("{} beat {}", "tick".green(), tick.step);
        }
    }

    fn on_stopped(&mut self) {
        let _ = self.done.send(());
    }
}

fn describe_ref(riff: &Riff, note: NoteRef) -> String {
    let top = &riff.notes()[note.index];
    match (top, note.member) {
        (Note::Group(group), Some(member)) => {
            let (label, num) = match &group.notes[member] {
                GroupItem::Rest(r) => ("rest", r.num),
                GroupItem::Note(n) => (if n.accent { "note >" } else { "note" }, n.num),
            };
            format!(
                "{label} {} ({}/{} of {}-tuplet)",
                class_name(num),
                member + 1,
                group.notes.len(),
                group.tuplet
            )
        }
        (Note::Rest(r), _) => format!("rest {}", class_name(r.num)),
        (Note::Note(n), _) => {
            format!(
                "{} {}",
                if n.accent { "note >" } else { "note" },
                class_name(n.num)
            )
        }
        (Note::Group(_), None) => "group".to_string(),
    }
}
