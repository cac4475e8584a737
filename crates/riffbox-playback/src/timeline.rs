//! The playback timeline: one measure loop, precomputed.
//!
//! Timing derives from two intervals. The beat interval is
//! `(60 / BPM) / (base / 4)` seconds; the tick interval (one 32nd note) is
//! the beat interval divided by the beat's tick count. A plain note spans
//! `ticks * tick_interval`; a tuplet member spans
//! `ticks * tick_interval / tuplet * 2`, which squeezes the whole group
//! into its nominal duration.
//!
//! Every note walks the same path: announce the note, tick if it starts
//! on a beat boundary, then wait out its span - splitting the wait at any
//! beat boundary it crosses so a tick can be emitted exactly there.

use std::time::Duration;

use riffbox_core::{Meter, Note, Riff};

/// Boundary tolerance in seconds. Residual float drift and sub-epsilon
/// tails both land within it.
pub const TICK_EPSILON: f64 = 0.01;

/// Which note is sounding: a top-level index, plus the member index when
/// the note is a tuplet group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteRef {
    pub index: usize,
    pub member: Option<usize>,
}

/// One event of the precomputed loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    /// A note (or tuplet member) becomes active. Stop requests are
    /// observed here.
    Note(NoteRef),
    /// Metronome tick, always on a beat boundary.
    Tick { measure_start: bool },
    /// Timed wait until the next event.
    Sleep(Duration),
}

/// A precomputed single pass over the riff.
///
/// The player repeats the pass indefinitely; the pass is loop-invariant
/// because a well-formed riff spans whole beats, so the beat phase returns
/// to zero at the end of the measure.
#[derive(Debug, Clone)]
pub struct Timeline {
    steps: Vec<Step>,
    beat_interval: f64,
    tick_interval: f64,
}

impl Timeline {
    /// Precompute the loop for a riff at the given tempo and meter.
    ///
    /// `bpm` must be positive and finite and the riff non-empty; the
    /// player validates both.
    pub fn new(riff: &Riff, bpm: f64, meter: Meter) -> Timeline {
        debug_assert!(bpm > 0.0);
        let multiplier = meter.base as f64 / 4.0;
        let beat_interval = 60.0 / bpm / multiplier;
        let tick_interval = beat_interval / (8.0 / multiplier);

        let mut builder = Builder {
            steps: Vec::new(),
            current_time: 0.0,
            beat_interval,
        };
        for (index, note) in riff.notes().iter().enumerate() {
            match note {
                Note::Group(group) => {
                    for (member, item) in group.notes.iter().enumerate() {
                        let span =
                            tick_interval * item.ticks() as f64 / group.tuplet as f64 * 2.0;
                        builder.play(
                            NoteRef {
                                index,
                                member: Some(member),
                            },
                            index == 0,
                            span,
                        );
                    }
                }
                other => {
                    let span = tick_interval * other.ticks() as f64;
                    builder.play(NoteRef {
                        index,
                        member: None,
                    }, index == 0, span);
                }
            }
        }
        Timeline {
            steps: builder.steps,
            beat_interval,
            tick_interval,
        }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Seconds per beat.
    pub fn beat_interval(&self) -> f64 {
        self.beat_interval
    }

    /// Seconds per 32nd-note tick.
    pub fn tick_interval(&self) -> f64 {
        self.tick_interval
    }
}

struct Builder {
    steps: Vec<Step>,
    /// Seconds since the last beat boundary.
    current_time: f64,
    beat_interval: f64,
}

impl Builder {
    fn play(&mut self, note: NoteRef, measure_start: bool, span: f64) {
        self.steps.push(Step::Note(note));

        // Tick when the note lands on a beat boundary, within epsilon on
        // either side of it.
        let phase = self.current_time % self.beat_interval;
        if phase < TICK_EPSILON || self.beat_interval - phase < TICK_EPSILON {
            self.steps.push(Step::Tick { measure_start });
            self.current_time = 0.0;
        }

        let mut note_time = span;
        if self.current_time + note_time > self.beat_interval {
            // Finish the current beat first...
            if self.current_time > 0.0 {
                let head = self.beat_interval - self.current_time;
                self.sleep(head);
                self.steps.push(Step::Tick {
                    measure_start: false,
                });
                note_time -= head;
            }
            // ...then whole beats inside the note. The loop is strict so a
            // span ending exactly on a boundary leaves that boundary's tick
            // to the next note's check - ticks stay strictly monotonic.
            while note_time > self.beat_interval {
                self.sleep(self.beat_interval);
                self.steps.push(Step::Tick {
                    measure_start: false,
                });
                note_time -= self.beat_interval;
            }
            // ...then the sub-beat tail.
            self.current_time = 0.0;
            if note_time > TICK_EPSILON {
                self.sleep(note_time);
                self.current_time = note_time;
            }
        } else {
            self.sleep(note_time);
            self.current_time += note_time;
        }
    }

    fn sleep(&mut self, secs: f64) {
        self.steps.push(Step::Sleep(Duration::from_secs_f64(secs)));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn secs(step: &Step) -> f64 {
        match step {
            Step::Sleep(d) => d.as_secs_f64(),
            other => panic!("expected a sleep, got {other:?}"),
        }
    }

    #[test]
    fn four_quarters_tick_every_half_second() {
        let riff = Riff::parse("|n3|n3|n3|n3").unwrap();
        let timeline = Timeline::new(&riff, 120.0, Meter { step: 4, base: 4 });
        let steps = timeline.steps();

        assert_eq!(steps.len(), 12);
        for n in 0..4 {
            assert_eq!(
                steps[3 * n],
                Step::Note(NoteRef {
                    index: n,
                    member: None
                })
            );
            assert_eq!(
                steps[3 * n + 1],
                Step::Tick {
                    measure_start: n == 0
                }
            );
            assert!((secs(&steps[3 * n + 2]) - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn multi_beat_note_splits_its_wait_at_the_boundary() {
        // A quarter in an eighth-base measure spans two beats.
        let riff = Riff::parse("|n3").unwrap();
        let timeline = Timeline::new(&riff, 120.0, Meter { step: 2, base: 8 });
        let steps = timeline.steps();

        assert!((timeline.beat_interval() - 0.25).abs() < 1e-12);
        assert_eq!(steps.len(), 5);
        assert_eq!(
            steps[0],
            Step::Note(NoteRef {
                index: 0,
                member: None
            })
        );
        assert_eq!(steps[1], Step::Tick { measure_start: true });
        assert!((secs(&steps[2]) - 0.25).abs() < 1e-9);
        assert_eq!(
            steps[3],
            Step::Tick {
                measure_start: false
            }
        );
        assert!((secs(&steps[4]) - 0.25).abs() < 1e-9);
    }

    #[test]
    fn tuplet_members_fill_the_nominal_span() {
        let riff = Riff::parse("|g3(3){n2n2n2}|n3").unwrap();
        let timeline = Timeline::new(&riff, 120.0, Meter { step: 2, base: 4 });
        let steps = timeline.steps();

        let notes: Vec<NoteRef> = steps
            .iter()
            .filter_map(|s| match s {
                Step::Note(n) => Some(*n),
                _ => None,
            })
            .collect();
        assert_eq!(
            notes,
            vec![
                NoteRef {
                    index: 0,
                    member: Some(0)
                },
                NoteRef {
                    index: 0,
                    member: Some(1)
                },
                NoteRef {
                    index: 0,
                    member: Some(2)
                },
                NoteRef {
                    index: 1,
                    member: None
                },
            ]
        );

        let tick_count = steps
            .iter()
            .filter(|s| matches!(s, Step::Tick { .. }))
            .count();
        assert_eq!(tick_count, 2);

        let total: f64 = steps
            .iter()
            .filter_map(|s| match s {
                Step::Sleep(d) => Some(d.as_secs_f64()),
                _ => None,
            })
            .sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn ticks_are_monotonic_and_beat_aligned() {
        // A full measure with dots, a tuplet, a rest, and mixed fine
        // values, at a tempo whose intervals are not exactly representable.
        let riff = Riff::parse("|n2.n1|g3(3){n2n2n2}|r3|n0n0an1n2").unwrap();
        let meter = Meter { step: 4, base: 4 };
        let timeline = Timeline::new(&riff, 90.0, meter);
        let beat = timeline.beat_interval();

        let mut now = 0.0;
        let mut tick_instants = Vec::new();
        // Two passes over the loop, as the player would run them.
        for _ in 0..2 {
            for step in timeline.steps() {
                match step {
                    Step::Sleep(d) => now += d.as_secs_f64(),
                    Step::Tick { .. } => tick_instants.push(now),
                    Step::Note(_) => {}
                }
            }
        }

        assert_eq!(tick_instants.len(), 8);
        let mut prev = f64::NEG_INFINITY;
        for instant in &tick_instants {
            assert!(*instant > prev, "ticks not strictly monotonic");
            prev = *instant;
            let beats = instant / beat;
            assert!(
                (beats - beats.round()).abs() < 1e-6,
                "tick off the beat grid at {instant}"
            );
        }
    }

    #[test]
    fn measure_start_only_on_the_first_note() {
        let riff = Riff::parse("|r3|n3").unwrap();
        let timeline = Timeline::new(&riff, 120.0, Meter { step: 2, base: 4 });
        let starts: Vec<bool> = timeline
            .steps()
            .iter()
            .filter_map(|s| match s {
                Step::Tick { measure_start } => Some(*measure_start),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec![true, false]);
    }
}
