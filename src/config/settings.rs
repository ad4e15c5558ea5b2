//! Operator settings
//!
//! Developer-facing knobs (long-press timing, list rendering, boot detection,
//! factory defaults). Stored as pretty JSON next to the preset storage; every
//! field falls back to its default when missing.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::constants::storage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Seconds a preset button must be held before its options open
    #[serde(default = "default_options_timeout_secs")]
    pub options_timeout_secs: u64,

    /// Skip the release action once the options prompt has opened
    #[serde(default)]
    pub suppress_release_after_options: bool,

    /// Append ` [index]` to preset labels
    #[serde(default)]
    pub show_index: bool,

    /// Marker appended to the default preset's label
    #[serde(default = "default_terminator")]
    pub default_terminator: String,

    /// Minimum uptime before startup continues
    #[serde(default = "default_uptime_delay_mins")]
    pub uptime_delay_mins: u64,

    /// Extra window after the uptime delay still treated as a fresh boot
    #[serde(default = "default_boot_window_mins")]
    pub boot_window_mins: u64,

    /// Pin written into a freshly generated configuration
    #[serde(default = "default_factory_pin")]
    pub factory_pin: String,

    /// Prefix for generated output names (`HDMI 1`, `HDMI 2`, ...)
    #[serde(default = "default_initial_output_name")]
    pub initial_output_name: String,

    /// Number of output names generated for a fresh configuration
    #[serde(default = "default_factory_outputs")]
    pub factory_outputs: u32,

    /// Namespace of this component inside the shared store
    #[serde(default = "default_component")]
    pub component: String,
}

fn default_options_timeout_secs() -> u64 {
    3
}

fn default_terminator() -> String {
    "✪".to_string()
}

fn default_uptime_delay_mins() -> u64 {
    2
}

fn default_boot_window_mins() -> u64 {
    2
}

fn default_factory_pin() -> String {
    "000000".to_string()
}

fn default_initial_output_name() -> String {
    "HDMI".to_string()
}

fn default_factory_outputs() -> u32 {
    3
}

fn default_component() -> String {
    storage::DEFAULT_COMPONENT.to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            options_timeout_secs: default_options_timeout_secs(),
            suppress_release_after_options: false,
            show_index: false,
            default_terminator: default_terminator(),
            uptime_delay_mins: default_uptime_delay_mins(),
            boot_window_mins: default_boot_window_mins(),
            factory_pin: default_factory_pin(),
            initial_output_name: default_initial_output_name(),
            factory_outputs: default_factory_outputs(),
            component: default_component(),
        }
    }
}

impl Settings {
    pub fn options_timeout(&self) -> Duration {
        Duration::from_secs(self.options_timeout_secs)
    }

    pub fn uptime_delay(&self) -> Duration {
        Duration::from_secs(self.uptime_delay_mins * 60)
    }

    /// Uptime at or below this counts as a fresh boot rather than a restart
    pub fn boot_threshold(&self) -> Duration {
        Duration::from_secs((self.uptime_delay_mins + self.boot_window_mins) * 60)
    }

    pub fn default_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(storage::APP_DIR);
        path.push(storage::SETTINGS_FILENAME);
        path
    }

    /// Load settings from JSON, writing the defaults out when the file is missing
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!(path = %path.display(), "Settings file not found, creating defaults");
            let settings = Settings::default();
            settings.save(path)?;
            return Ok(settings);
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        let settings: Settings = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse settings JSON from {:?}", path))?;

        info!(path = %path.display(), "Loaded settings");
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create settings directory {:?}", parent))?;
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        fs::write(path, json).with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }
}
