//! The playback driver: a tokio task looping the timeline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tokio::task::JoinHandle;

use riffbox_core::{ConfigError, Meter, Riff};

use crate::timeline::{NoteRef, Step, Timeline};

/// A metronome tick, with the transport position it advances to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// First tick of a measure pass.
    pub measure_start: bool,
    /// Beat within the measure, 1-based.
    pub step: u32,
    /// Completed-measure count, starting at 0.
    pub measure: u32,
}

/// Collaborator seam for audio and rendering.
///
/// Callbacks run on the playback task between timed waits; they should
/// hand work off rather than block.
pub trait PlaybackSink: Send + 'static {
    /// A note (or tuplet member) starts sounding.
    fn on_note_active(&mut self, note: NoteRef);
    /// A metronome tick lands on a beat boundary.
    fn on_tick(&mut self, tick: Tick);
    /// The loop has wound down after a stop request.
    fn on_stopped(&mut self) {}
}

/// Errors raised when starting playback. There are no recoverable errors
/// once the loop runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlayerError {
    #[error("invalid playback config: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot play an empty riff")]
    EmptyRiff,
    #[error("BPM must be positive and finite (got {0})")]
    InvalidBpm(f64),
}

/// A running playback loop.
///
/// The riff is read-only for the lifetime of the loop. A tempo or meter
/// change means stopping this player and starting a fresh one, which
/// restarts from the first note of the measure.
#[derive(Debug)]
pub struct Player {
    active: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl Player {
    /// Spawn the playback loop on the current tokio runtime.
    pub fn start<S: PlaybackSink>(
        riff: &Riff,
        bpm: f64,
        meter: Meter,
        sink: S,
    ) -> Result<Player, PlayerError> {
        meter.validate()?;
        if riff.is_empty() {
            return Err(PlayerError::EmptyRiff);
        }
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(PlayerError::InvalidBpm(bpm));
        }

        let timeline = Timeline::new(riff, bpm, meter);
        let active = Arc::new(AtomicBool::new(true));
        let handle = tokio::spawn(run(timeline, meter.step, sink, Arc::clone(&active)));
        Ok(Player { active, handle })
    }

    /// Request a stop. The loop exits at the next note boundary, after
    /// finishing any wait already in progress.
    pub fn stop(&self) {
        self.active.store(false, Ordering::Relaxed);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Relaxed) && !self.handle.is_finished()
    }

    /// Wait for the loop to wind down after [`Player::stop`].
    pub async fn stopped(self) {
        let _ = self.handle.await;
    }
}

async fn run<S: PlaybackSink>(
    timeline: Timeline,
    measure_steps: u32,
    mut sink: S,
    active: Arc<AtomicBool>,
) {
    let mut step_counter = 0u32;
    let mut measure_counter = 0u32;

    'playing: loop {
        for step in timeline.steps() {
            match *step {
                Step::Note(note) => {
                    if !active.load(Ordering::Relaxed) {
                        break 'playing;
                    }
                    sink.on_note_active(note);
                }
                Step::Tick { measure_start } => {
                    step_counter += 1;
                    if step_counter > measure_steps {
                        step_counter = 1;
                        measure_counter += 1;
                    }
                    sink.on_tick(Tick {
                        measure_start,
                        step: step_counter,
                        measure: measure_counter,
                    });
                }
                Step::Sleep(duration) => tokio::time::sleep(duration).await,
            }
        }
    }
    sink.on_stopped();
}
