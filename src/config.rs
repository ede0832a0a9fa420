//! User settings, stored as JSON under the platform config directory.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::scale::Scale;
use crate::messaging::Chain;

const APP_DIR: &str = "blocktone";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chain: Chain,
    pub scale: Scale,
    /// Master output gain, applied after the analysis tap.
    pub volume: f32,
    pub output_device: Option<String>,
    pub midi_output_port: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            chain: Chain::default(),
            scale: Scale::default(),
            volume: 0.8,
            output_device: None,
            midi_output_port: None,
        }
    }
}

impl Settings {
    pub fn settings_dir() -> Result<PathBuf> {
        let mut path = dirs::config_dir().context("Could not find config directory")?;
        path.push(APP_DIR);
        Ok(path)
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::settings_dir()?.join(SETTINGS_FILE))
    }

    /// Load from the default location. Missing or unreadable settings fall
    /// back to defaults.
    pub fn load_or_default() -> Self {
        match Self::default_path().and_then(|path| Self::load_from(&path)) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Using default settings: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let file = File::open(path)
            .with_context(|| format!("Failed to open settings file {}", path.display()))?;
        let settings = serde_json::from_reader(file)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("Failed to create settings directory")?;
        }
        let file = File::create(path).context("Failed to create settings file")?;
        serde_json::to_writer_pretty(file, self).context("Failed to write settings")?;
        Ok(())
    }
}
