//! Generation feature toggles and the measure meter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Measure bases with a defined tick subdivision.
pub const SUPPORTED_BASES: [u32; 3] = [4, 8, 16];

/// Errors for meter and playback preconditions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unsupported measure base {0} (expected one of 4, 8, 16)")]
    UnsupportedBase(u32),
    #[error("measure step must be at least 1")]
    ZeroStep,
}

/// Feature toggles gating what the generator may emit.
///
/// Pure data: a generation call takes the configuration by reference and
/// never mutates it. The duration toggles select which classes the sampler
/// may pick; the rest are independent feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RiffConfig {
    /// Thirty-second notes.
    pub num0: bool,
    /// Sixteenth notes.
    pub num1: bool,
    /// Eighth notes.
    pub num2: bool,
    /// Quarter notes.
    pub num3: bool,
    /// Allow rests.
    pub rest: bool,
    /// Allow dotted durations.
    pub dot: bool,
    /// Allow accents.
    pub accent: bool,
    /// Allow triplets.
    pub group3: bool,
    /// Allow quintuplets.
    pub group5: bool,
    /// Allow septuplets.
    pub group7: bool,
    /// Fill tuplet groups by recursive sampling instead of uniform
    /// subdivision.
    pub combi_groups: bool,
}

impl Default for RiffConfig {
    fn default() -> Self {
        RiffConfig {
            num0: false,
            num1: false,
            num2: false,
            num3: true,
            rest: false,
            dot: false,
            accent: false,
            group3: false,
            group5: false,
            group7: false,
            combi_groups: false,
        }
    }
}

impl RiffConfig {
    /// Is the duration class `num` enabled?
    pub fn class_enabled(&self, num: u8) -> bool {
        match num {
            0 => self.num0,
            1 => self.num1,
            2 => self.num2,
            3 => self.num3,
            _ => false,
        }
    }

    /// Is the class one step finer than `num` enabled?
    ///
    /// Gates both tuplet emission (a quarter group needs eighths, an eighth
    /// group needs sixteenths) and dot eligibility (a dot needs the finer
    /// value it stands in for).
    pub fn finer_enabled(&self, num: u8) -> bool {
        match num {
            1 => self.num0,
            2 => self.num1,
            3 => self.num2,
            _ => false,
        }
    }

    /// Is the given tuplet size enabled?
    pub fn group_enabled(&self, tuplet: u8) -> bool {
        match tuplet {
            3 => self.group3,
            5 => self.group5,
            7 => self.group7,
            _ => false,
        }
    }
}

/// Measure meter: `step` beats of `base` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meter {
    pub step: u32,
    pub base: u32,
}

impl Meter {
    pub fn new(step: u32, base: u32) -> Result<Self, ConfigError> {
        let meter = Meter { step, base };
        meter.validate()?;
        Ok(meter)
    }

    /// Check the meter against the supported domain.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !SUPPORTED_BASES.contains(&self.base) {
            return Err(ConfigError::UnsupportedBase(self.base));
        }
        if self.step == 0 {
            return Err(ConfigError::ZeroStep);
        }
        Ok(())
    }

    /// Ticks in one beat of the measure base (a 32nd note is one tick).
    pub fn beat_ticks(&self) -> u32 {
        32 / self.base
    }

    /// Total ticks in one measure.
    pub fn ticks(&self) -> u32 {
        self.step * self.beat_ticks()
    }
}

impl Default for Meter {
    fn default() -> Self {
        Meter { step: 4, base: 4 }
    }
}
