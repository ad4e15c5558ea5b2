//! Configuration for the preset controller
//!
//! - **settings**: operator knobs loaded from a JSON file at startup
//! - **model**: the persisted configuration root (pin, output names, presets)
//! - **validation**: checks applied to dialog input before it reaches the model

pub mod model;
pub mod settings;
pub mod validation;

pub use model::{
    Configuration, OutputRoute, PinMode, PinProtection, PresetBook, PresetEntry, RoleAssignment,
};
pub use settings::Settings;
