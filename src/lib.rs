//! Monitor output presets for multi-output video endpoints
//!
//! Named presets capture per-output monitor roles and matrix routes. They are
//! persisted through a [`persistence::ConfigStore`], recalled from the preset
//! list panel, and reapplied automatically when the endpoint wakes from
//! standby or the last call ends. [`app::PresetController`] ties everything
//! together as a single event-driven actor.

#![forbid(unsafe_code)]

pub mod activation;
pub mod app;
pub mod config;
pub mod constants;
pub mod device;
pub mod dispatch;
pub mod error;
pub mod maker;
pub mod matrix;
pub mod persistence;
pub mod registry;
pub mod triggers;
pub mod ui;

pub use app::{HostEvent, PresetController};
pub use error::{Error, Result};
