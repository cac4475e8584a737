//! Riffbox Playback - Metronome-Aligned Riff Playback
//!
//! Playback splits into two layers:
//!
//! - [`timeline`]: a pure, precomputed step sequence for one loop of the
//!   measure - note-active boundaries, metronome ticks, and timed waits.
//!   No clock, no IO; fully testable by inspection.
//! - [`player`]: a tokio task that walks the timeline forever, sleeping
//!   between events and forwarding them to a [`player::PlaybackSink`].
//!
//! Ticks always land on beat boundaries and are strictly monotonic, even
//! when a note spans several beats. Stopping is observed at note
//! boundaries only; a started wait always completes.

pub mod player;
pub mod timeline;

// Re-export main types
pub use player::{PlaybackSink, Player, PlayerError, Tick};
pub use timeline::{NoteRef, Step, Timeline, TICK_EPSILON};

/// Crate version for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
