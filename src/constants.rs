//! Application-wide constants
//!
//! Widget ids, correlation prefixes, validation limits and timing values used
//! throughout the crate, kept in one place so the UI contract is easy to audit.

use std::time::Duration;

/// Persistence keys
pub mod storage {
    /// Key under which the configuration root is stored
    pub const CONFIG_KEY: &str = "DisplaySystemConfig";

    /// Component namespace used when no settings override it
    pub const DEFAULT_COMPONENT: &str = "monitor-presets";

    /// Directory under the user config dir holding settings and storage
    pub const APP_DIR: &str = "monitor-presets";

    /// Settings file name
    pub const SETTINGS_FILENAME: &str = "settings.json";

    /// Storage file name
    pub const STORAGE_FILENAME: &str = "storage.json";
}

/// Widget event namespaces owned by this crate
pub mod namespaces {
    /// Preset list panel
    pub const PRESETS: &str = "dop";

    /// Preset maker panel
    pub const MAKER: &str = "dopm";
}

/// Panel ids
pub mod panels {
    /// Home screen panel listing saved presets
    pub const PRESET_LIST: &str = "dop";

    /// Control panel entry that gates access to the maker
    pub const MAKER_VISIBLE: &str = "dopm_visible";

    /// Hidden maker panel opened after pin entry
    pub const MAKER_HIDDEN: &str = "dopm_hidden";
}

/// Widget ids receiving feedback values
pub mod widgets {
    pub const PRESET_SELECT: &str = "dop~Presets~Select";
    pub const OUTPUT_SELECT: &str = "dopm~Maker~OutputSelect";
    pub const MONITOR_ROLE: &str = "dopm~Maker~MonitorRole";
    pub const SOURCE_SELECT: &str = "dopm~Maker~Matrix:SourceSelect";
    pub const ROUTE_ORDER: &str = "dopm~Maker~Matrix:RouteOrder";
    pub const MONITORS_SELECT: &str = "dopm~Config~MonitorsConfig:Select";
    pub const PIN_MODE: &str = "dopm~Config~PinProtection:Mode";
}

/// Input validation limits
pub mod validation {
    /// Preset names are 1-20 printable ASCII characters
    pub const NAME_MIN_LEN: usize = 1;
    pub const NAME_MAX_LEN: usize = 20;

    /// Pins are 4-8 ASCII digits
    pub const PIN_MIN_DIGITS: usize = 4;
    pub const PIN_MAX_DIGITS: usize = 8;

    /// Maximum visual weight of an output name (8 wide characters)
    pub const MAX_OUTPUT_NAME_WEIGHT: f64 = 8.0;

    /// Characters rendered at full width
    pub const HEAVY_CHARS: &str = "MW@#$%&*(){}[]";

    /// Characters rendered narrow (whitespace is also narrow)
    pub const LIGHT_CHARS: &str = "iltfj.,:;'`!-";

    pub const HEAVY_WEIGHT: f64 = 1.0;
    pub const STANDARD_WEIGHT: f64 = 0.75;
    pub const LIGHT_WEIGHT: f64 = 0.3;
}

/// Dialog durations in seconds
pub mod dialogs {
    pub const PIN_ENTRY_SECS: u32 = 60;
    pub const PRESET_NAME_SECS: u32 = 120;
    pub const SOURCE_REMINDER_SECS: u32 = 20;

    /// Prompts carry at most this many options
    pub const MAX_PROMPT_OPTIONS: usize = 4;
}

/// Polling interval while waiting for the device to finish booting
pub const UPTIME_POLL_INTERVAL: Duration = Duration::from_secs(1);
