//! Riffbox Core - Constrained Rhythm Generation
//!
//! This crate owns the rhythm data model (notes, rests, tuplet groups), the
//! compact text grammar riffs are saved in, and the generator that produces
//! new riffs by constrained random sampling.
//!
//! # Determinism
//!
//! Generation is fully deterministic for a given seed. The RNG is a PCG32
//! stream whose state is derived from the user seed via a BLAKE3 hash with a
//! domain salt, so the same seed always yields the same riff regardless of
//! platform.
//!
//! # Module Structure
//!
//! - [`note`]: the three-case note sum type and tick-duration arithmetic
//! - [`config`]: generation feature toggles and the measure meter
//! - [`riff`]: the measure container plus grammar parser/serializer
//! - [`savefile`]: the one-line `R0:` save format
//! - [`generate`]: the beat-by-beat riff generator

pub mod config;
pub mod generate;
pub mod note;
pub mod riff;
pub mod savefile;

// Re-export main types
pub use config::{ConfigError, Meter, RiffConfig};
pub use generate::{generate_riff, generate_with, make_group, GenerateError};
pub use note::{GroupItem, GroupNote, Layout, Note, PlainNote, RestNote};
pub use riff::{MalformedRiffError, Riff};
pub use savefile::{format_save, parse_save, LoadError};

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
