//! Persisted player settings.

use std::{fs, io::ErrorKind, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Preferences kept between runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    /// Interpolate the snake between ticks instead of jumping cell to cell.
    pub(crate) smooth_movement: bool,
}

impl Settings {
    /// Reads settings from `path`; a missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => {
                log::debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(error) => {
                return Err(error)
                    .with_context(|| format!("failed to read settings at {}", path.display()))
            }
        };
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse settings at {}", path.display()))
    }

    /// Writes settings to `path`, replacing any previous file.
    pub(crate) fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string(self).context("failed to serialise settings")?;
        fs::write(path, contents)
            .with_context(|| format!("failed to write settings to {}", path.display()))
    }
}
