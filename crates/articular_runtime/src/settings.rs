//! Runtime settings

use anyhow::{ensure, Context, Result};
use articular_core::WorldConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Host loop settings, read from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub world: WorldConfig,
    /// Number of ticks to run before shutting down.
    pub ticks: u32,
    pub tick_hz: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            ticks: 3,
            tick_hz: 60,
        }
    }
}

impl RuntimeSettings {
    /// Load settings from `path`, or use the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading settings from {}", path.display()))?;
                Self::from_json(&text)
                    .with_context(|| format!("parsing settings in {}", path.display()))?
            }
            None => Self::default(),
        };
        ensure!(settings.tick_hz > 0, "tick_hz must be positive");
        Ok(settings)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}
