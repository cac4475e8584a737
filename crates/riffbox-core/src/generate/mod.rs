//! Beat-by-beat riff generation by constrained random sampling.
//!
//! A measure is carved into beats by metric grouping: take 8 ticks while
//! the remaining measure allows it, else 4, else 2. Within a beat, notes
//! are drawn by rejection sampling: a candidate is a set of independent
//! fair coin flips (one per enabled feature and duration class), the
//! finest enabled class whose coin fired wins (quarter as fallback), and
//! candidates that overflow the beat's remaining ticks are redrawn.
//!
//! Sampling is bounded: a slot that rejects [`MAX_DRAWS`] candidates in a
//! row reports [`GenerateError::Exhausted`] instead of spinning - the only
//! way to get there is a configuration whose enabled durations cannot fill
//! the measure.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use thiserror::Error;

use crate::config::{ConfigError, Meter, RiffConfig};
use crate::note::{annotate_beat, base_ticks, dot_extra, Layout, Note, PlainNote, RestNote};
use crate::riff::Riff;

mod group;


pub use group::make_group;

/// Candidate draws allowed per slot before generation gives up.
pub const MAX_DRAWS: u32 = 1024;

const SEED_SALT: &str = "riffbox.generate";

/// Error type for riff generation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    /// Meter outside the supported domain.
    #[error("invalid generation config: {0}")]
    Config(#[from] ConfigError),

    /// No enabled duration could be placed; the configuration cannot fill
    /// the measure.
    #[error("no enabled duration fits the remaining {remaining} ticks (rejection sampling gave up)")]
    Exhausted { remaining: u32 },
}

/// Derive the generation RNG from a user seed.
///
/// PCG32 state comes from a BLAKE3 hash of the seed plus a domain salt, so
/// a seed maps to the same riff on every platform.
fn rng_for(seed: u64) -> Pcg32 {
    let mut input = Vec::with_capacity(8 + 1 + SEED_SALT.len());
    input.extend_from_slice(&seed.to_le_bytes());
    input.push(0);
    input.extend_from_slice(SEED_SALT.as_bytes());

    let hash = blake3::hash(&input);
    let bytes: [u8; 8] = hash.as_bytes()[0..8].try_into().unwrap();
    Pcg32::seed_from_u64(u64::from_le_bytes(bytes))
}

/// Generate a one-measure riff, deterministically for a given seed.
pub fn generate_riff(
    config: &RiffConfig,
    meter: Meter,
    seed: u64,
) -> Result<Riff, GenerateError> {
    let mut rng = rng_for(seed);
    generate_with(config, meter, &mut rng)
}

/// Generate a one-measure riff from a caller-supplied random stream.
pub fn generate_with<R: Rng>(
    config: &RiffConfig,
    meter: Meter,
    rng: &mut R,
) -> Result<Riff, GenerateError> {
    meter.validate()?;

    let mut notes = Vec::new();
    let mut total = meter.ticks();
    while total > 0 {
        // Metric grouping: a 6-tick remainder splits 4+2 rather than
        // slicing by the measure base.
        let beat_ticks = if total >= 8 {
            8
        } else if total >= 4 {
            4
        } else {
            2
        };
        total -= beat_ticks;

        let mut beat = fill_beat(config, rng, beat_ticks)?;
        annotate_beat(&mut beat, beat_ticks);
        notes.append(&mut beat);
    }
    Ok(Riff::from_notes(notes))
}

/// One drawn candidate: every feature coin is flipped up front, then the
/// configuration decides which of them matter.
struct Candidate {
    rest: bool,
    dot: bool,
    accent: bool,
    group3: bool,
    group5: bool,
    group7: bool,
    num0: bool,
    num1: bool,
    num2: bool,
}

impl Candidate {
    fn draw<R: Rng>(rng: &mut R, first_slot: bool) -> Self {
        Candidate {
            // A rest is only ever legal on the beat's first slot.
            rest: rng.gen_bool(0.5) && first_slot,
            dot: rng.gen_bool(0.5),
            accent: rng.gen_bool(0.5),
            group3: rng.gen_bool(0.5),
            group5: rng.gen_bool(0.5),
            group7: rng.gen_bool(0.5),
            num0: rng.gen_bool(0.5),
            num1: rng.gen_bool(0.5),
            num2: rng.gen_bool(0.5),
        }
    }

    /// Finest enabled class whose coin fired; quarter as fallback.
    fn pick_num(&self, config: &RiffConfig) -> u8 {
        if config.num0 && self.num0 {
            0
        } else if config.num1 && self.num1 {
            1
        } else if config.num2 && self.num2 {
            2
        } else {
            3
        }
    }

    /// Tuplet size to emit, if any coin fired for an enabled tuplet type.
    /// Preference order is 3, then 5, then 7.
    fn tuplet(&self, config: &RiffConfig) -> Option<u8> {
        [(3, self.group3), (5, self.group5), (7, self.group7)]
            .into_iter()
            .find(|&(size, fired)| fired && config.group_enabled(size))
            .map(|(size, _)| size)
    }
}

fn fill_beat<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    beat_ticks: u32,
) -> Result<Vec<Note>, GenerateError> {
    let mut notes = Vec::new();
    let mut remaining = beat_ticks;
    let mut first_slot = true;
    // One rest may open the beat; never two rests back to back.
    let mut rest_allowed = config.rest;

    while remaining > 0 {
        let (num, candidate) = draw_fitting(config, rng, remaining, first_slot)?;

        // Tuplets sit only on eighths and quarters, and need the next-finer
        // class available for their members.
        let tuplet = if num > 1 && config.finer_enabled(num) {
            candidate.tuplet(config)
        } else {
            None
        };
        let note = if let Some(tuplet) = tuplet {
            Note::Group(make_group(config, rng, num, tuplet)?)
        } else {
            let is_rest = rest_allowed && candidate.rest;
            if config.rest {
                rest_allowed = !is_rest;
            }
            let dots = roll_dots(config, rng, num, candidate.dot, remaining);
            if is_rest {
                Note::Rest(RestNote {
                    num,
                    dots,
                    layout: Layout::default(),
                })
            } else {
                Note::Note(PlainNote {
                    num,
                    dots,
                    accent: config.accent && candidate.accent,
                    layout: Layout::default(),
                })
            }
        };

        remaining -= note.ticks();
        first_slot = false;
        notes.push(note);
    }
    Ok(notes)
}

fn draw_fitting<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    remaining: u32,
    first_slot: bool,
) -> Result<(u8, Candidate), GenerateError> {
    for _ in 0..MAX_DRAWS {
        let candidate = Candidate::draw(rng, first_slot);
        let num = candidate.pick_num(config);
        if base_ticks(num) <= remaining {
            return Ok((num, candidate));
        }
    }
    Err(GenerateError::Exhausted { remaining })
}

/// Roll dots onto a freshly placed note.
///
/// Each dot needs the class one finer than the current dot level enabled,
/// a base worth more than one tick, and room left in the beat for the
/// extended duration; the dot coin is redrawn after every dot.
fn roll_dots<R: Rng>(
    config: &RiffConfig,
    rng: &mut R,
    num: u8,
    mut dot_candidate: bool,
    remaining: u32,
) -> u8 {
    if !config.dot {
        return 0;
    }
    let base = base_ticks(num);
    let mut dots = 0u8;
    let mut dot_num = num;
    while dot_candidate
        && config.finer_enabled(dot_num)
        && base > 1
        && base + dot_extra(num, dots + 1) <= remaining
    {
        dots += 1;
        dot_num -= 1;
        dot_candidate = rng.gen_bool(0.5);
    }
    dots
}
