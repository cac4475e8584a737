//! One-line save format: `R0:<step>_<base>:<riff>`.
//!
//! The prefix versions the line; only `R0` exists. File IO belongs to the
//! caller - this module formats and parses strings.

use thiserror::Error;

use crate::config::{ConfigError, Meter};
use crate::riff::{MalformedRiffError, Riff};

/// Version prefix of the save line.
pub const SAVE_PREFIX: &str = "R0";

/// Errors raised when loading a save line. All are fatal for that line;
/// the caller keeps whatever riff it already had.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("unsupported save prefix '{found}' (expected 'R0')")]
    BadPrefix { found: String },
    #[error("malformed meter field '{found}' (expected '<step>_<base>')")]
    BadMeter { found: String },
    #[error("invalid meter: {0}")]
    Config(#[from] ConfigError),
    #[error("malformed riff: {0}")]
    Riff(#[from] MalformedRiffError),
}

/// Render a riff and its meter as a save line (no trailing newline).
pub fn format_save(meter: Meter, riff: &Riff) -> String {
    format!("{SAVE_PREFIX}:{}_{}:{riff}", meter.step, meter.base)
}

/// Parse a save line back into its meter and riff.
pub fn parse_save(line: &str) -> Result<(Meter, Riff), LoadError> {
    let line = line.trim_end();
    let mut parts = line.splitn(3, ':');
    let prefix = parts.next().unwrap_or("");
    if prefix != SAVE_PREFIX {
        return Err(LoadError::BadPrefix {
            found: prefix.to_string(),
        });
    }
    let meter_field = parts.next().unwrap_or("");
    let meter = parse_meter(meter_field)?;
    meter.validate()?;
    let riff = Riff::parse(parts.next().unwrap_or(""))?;
    Ok((meter, riff))
}

fn parse_meter(field: &str) -> Result<Meter, LoadError> {
    let bad = || LoadError::BadMeter {
        found: field.to_string(),
    };
    let (step, base) = field.split_once('_').ok_or_else(bad)?;
    let step = step.parse().map_err(|_| bad())?;
    let base = base.parse().map_err(|_| bad())?;
    Ok(Meter { step, base })
}
