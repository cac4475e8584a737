//! Subcommand implementations.

use std::fs;
use std::path::Path;

use anyhow::Context;

use riffbox_core::RiffConfig;

pub mod generate;
pub mod inspect;
pub mod play;

/// Read a riff config from a JSON file, or fall back to the default
/// (quarters only, everything else off).
pub(crate) fn load_config(path: Option<&Path>) -> anyhow::Result<RiffConfig> {
    let Some(path) = path else {
        return Ok(RiffConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    Ok(config)
}

/// Human name of a duration class.
pub(crate) fn class_name(num: u8) -> &'static str {
    match num {
        0 => "32nd",
        1 => "16th",
        2 => "8th",
        _ => "quarter",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_config_path_falls_back_to_default() {
        assert_eq!(load_config(None).unwrap(), RiffConfig::default());
    }

    #[test]
    fn class_names() {
        assert_eq!(class_name(0), "32nd");
        assert_eq!(class_name(3), "quarter");
    }
}
